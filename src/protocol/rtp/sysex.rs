//! SysEx segmentation in the MIDI command list
//!
//! Apple peers split long System Exclusive messages across RTP packets and
//! mark each piece by its first and last byte:
//!
//! | first | last | piece | delivered bytes |
//! |-------|------|-------|-----------------|
//! | `F0` | `F0` | first | all but the trailing `F0` |
//! | `F7` | `F0` | middle | without the leading `F7` and trailing `F0` |
//! | `F7` | `F7` | last | without the leading `F7`, ending on the closing `F7` |
//! | `F7` | `F4` | cancelled | the leading byte only |
//!
//! Anything else is delivered untouched.

use super::constants::{SYSEX_CANCEL, SYSEX_END, SYSEX_START};

/// Kind of SysEx piece a command list represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Not a segmented SysEx message
    Complete,
    /// Opens a segmented SysEx message
    First,
    /// Continues a segmented SysEx message
    Middle,
    /// Closes a segmented SysEx message
    Last,
    /// Aborts a segmented SysEx message
    Cancelled,
}

/// Deliverable window of a command list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Piece kind
    pub kind: SegmentKind,
    /// Offset of the first deliverable byte
    pub start: usize,
    /// Number of deliverable bytes
    pub len: usize,
}

impl Segment {
    /// Slice the deliverable bytes out of `commands`
    ///
    /// The window is clamped to `commands`, so a segment computed for a
    /// different length never reads out of bounds.
    #[must_use]
    pub fn apply<'a>(&self, commands: &'a [u8]) -> &'a [u8] {
        let start = self.start.min(commands.len());
        let end = start.saturating_add(self.len).min(commands.len());
        &commands[start..end]
    }
}

/// Classify a command list of `len` bytes from its first and last byte
///
/// For a single-byte list `first` and `last` are the same byte.
#[must_use]
pub fn segment(first: u8, last: u8, len: usize) -> Segment {
    let (kind, start, len) = match (first, last) {
        (SYSEX_START, SYSEX_START) => (SegmentKind::First, 0, len.saturating_sub(1)),
        (SYSEX_END, SYSEX_START) => (SegmentKind::Middle, 1, len.saturating_sub(2)),
        (SYSEX_END, SYSEX_END) => (SegmentKind::Last, 1, len.saturating_sub(1)),
        (SYSEX_END, SYSEX_CANCEL) => (SegmentKind::Cancelled, 0, 1),
        _ => (SegmentKind::Complete, 0, len),
    };

    Segment { kind, start, len }
}

/// Classify a command list
///
/// An empty list is a `Complete` segment with nothing to deliver.
#[must_use]
pub fn segment_of(commands: &[u8]) -> Segment {
    match (commands.first(), commands.last()) {
        (Some(&first), Some(&last)) => segment(first, last, commands.len()),
        _ => Segment {
            kind: SegmentKind::Complete,
            start: 0,
            len: 0,
        },
    }
}
