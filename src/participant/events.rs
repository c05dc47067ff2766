//! Participant events for application integration

use std::fmt;
use std::net::IpAddr;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The initiator sent `BY`
    PeerEnded,
    /// No sync from the initiator within the timeout
    TimedOut,
    /// The MIDI invitation could not be answered
    InvitationFailed,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerEnded => write!(f, "initiator ended session"),
            Self::TimedOut => write!(f, "initiator timed out"),
            Self::InvitationFailed => write!(f, "couldn't accept MIDI invitation"),
        }
    }
}

/// Events emitted by the participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantEvent {
    /// Both invitations accepted
    SessionEstablished {
        /// Session name of the initiator
        name: String,
        /// Initiator address
        address: IpAddr,
    },

    /// Session torn down, the participant is waiting for invitations again
    SessionEnded {
        /// Why
        reason: EndReason,
    },

    /// A clock synchronization exchange completed
    ClockSynchronized {
        /// Initiator clock minus ours, in 100 µs units
        offset: i64,
    },
}
