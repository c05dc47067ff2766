//! RTP-MIDI payload packets
//!
//! A MIDI packet is a 12-byte RTP header followed by a MIDI command section
//! (RFC 6295 §3). Only the command section is forwarded; the recovery journal
//! that may follow it is skipped.

mod packet;
pub mod sysex;

#[cfg(test)]
mod tests;

pub use packet::{CommandSectionHeader, MidiPacket, RtpHeader};
pub use sysex::{Segment, SegmentKind, segment};

/// RTP-MIDI protocol constants
pub mod constants {
    /// RTP version carried in the top two bits of the header
    pub const RTP_VERSION: u8 = 2;

    /// Dynamic payload type used by `AppleMIDI` for RTP-MIDI
    pub const PAYLOAD_TYPE: u8 = 0x61;

    /// SysEx start byte, also the "more segments follow" marker
    pub const SYSEX_START: u8 = 0xF0;

    /// SysEx end byte, also the "continuation" marker
    pub const SYSEX_END: u8 = 0xF7;

    /// Marker closing a cancelled SysEx segment
    pub const SYSEX_CANCEL: u8 = 0xF4;
}
