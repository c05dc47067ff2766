//! Session record and state

use std::net::IpAddr;

/// Session state
///
/// A session advances through the states in declaration order; any state can
/// fall back to [`SessionState::AwaitingControlInvitation`] on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for an `IN` on the control port
    #[default]
    AwaitingControlInvitation,

    /// Control invitation accepted, waiting for an `IN` on the MIDI port
    AwaitingMidiInvitation,

    /// Both invitations accepted, MIDI data flowing
    Connected,
}

impl SessionState {
    /// Check if `next` may follow this state
    #[must_use]
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (_, Self::AwaitingControlInvitation)
                | (Self::AwaitingControlInvitation, Self::AwaitingMidiInvitation)
                | (Self::AwaitingMidiInvitation, Self::Connected)
        )
    }

    /// Check if a session is established
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Everything known about the current session
///
/// Zeroed fields mean "not known yet".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    /// Current state
    pub state: SessionState,

    /// Token from the initiator's invitation
    pub initiator_token: u32,
    /// SSRC the initiator identifies itself with
    pub initiator_ssrc: u32,
    /// Our SSRC for this session
    pub local_ssrc: u32,

    /// Initiator address, from the control invitation
    pub remote_address: Option<IpAddr>,
    /// Initiator control port
    pub remote_control_port: u16,
    /// Initiator MIDI port, from the MIDI invitation
    pub remote_midi_port: u16,
    /// Initiator session name
    pub peer_name: String,

    /// RTP sequence number of the last MIDI packet
    pub last_midi_sequence: u16,
    /// Initiator clock minus ours, in 100 µs units
    pub clock_offset_estimate: i64,

    /// Sync clock reading of the last valid sync or accepted invitation
    pub last_sync_time: u64,
    /// Sync clock reading of the last feedback check
    pub last_feedback_time: u64,
    /// Sequence number reported in the last feedback packet
    pub last_feedback_sequence: u16,
}

impl Session {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything and wait for a new control invitation
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move to `next`, returning whether the move was allowed
    ///
    /// Refused moves leave the state untouched.
    pub(crate) fn advance(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        true
    }
}
