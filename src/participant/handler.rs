//! Receive handler for MIDI data

/// Consumer of received MIDI bytes
///
/// Called synchronously from [`Participant::poll`](super::Participant::poll),
/// once per RTP-MIDI packet, with SysEx segmentation markers already
/// stripped. Implementations must not block; the slice is only valid for the
/// duration of the call.
pub trait MidiHandler: Send {
    /// Handle one packet's worth of MIDI bytes
    fn on_midi(&mut self, data: &[u8]);
}

impl<F> MidiHandler for F
where
    F: FnMut(&[u8]) + Send,
{
    fn on_midi(&mut self, data: &[u8]) {
        self(data);
    }
}
