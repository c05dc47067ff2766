//! `AppleMIDI` session protocol packets
//!
//! Every session packet starts with the 16-bit signature `0xFFFF` followed by
//! a two-character ASCII command packed into a 16-bit word (first character
//! in the high byte).

mod end_session;
mod feedback;
mod invitation;
mod sync;

#[cfg(test)]
mod tests;

pub use end_session::EndSession;
pub use feedback::ReceiverFeedback;
pub use invitation::{Invitation, MAX_NAME_LEN, UNKNOWN_NAME};
pub use sync::SyncPacket;

use std::fmt;

use super::{DecodeError, read_u16, read_u32};

/// Signature opening every `AppleMIDI` session packet
pub const SIGNATURE: u16 = 0xFFFF;

/// Session protocol version
pub const PROTOCOL_VERSION: u32 = 2;

const fn command_word(code: &[u8; 2]) -> u16 {
    ((code[0] as u16) << 8) | code[1] as u16
}

/// `AppleMIDI` session commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    /// `IN`: session invitation
    Invitation = command_word(b"IN"),
    /// `OK`: invitation accepted
    InvitationAccepted = command_word(b"OK"),
    /// `NO`: invitation rejected
    InvitationRejected = command_word(b"NO"),
    /// `CK`: clock synchronization
    Sync = command_word(b"CK"),
    /// `RS`: receiver feedback
    ReceiverFeedback = command_word(b"RS"),
    /// `BY`: end of session
    EndSession = command_word(b"BY"),
}

impl Command {
    /// Wire value of the command
    #[must_use]
    pub const fn word(self) -> u16 {
        self as u16
    }

    /// Parse a wire command word
    #[must_use]
    pub fn from_word(word: u16) -> Option<Self> {
        [
            Self::Invitation,
            Self::InvitationAccepted,
            Self::InvitationRejected,
            Self::Sync,
            Self::ReceiverFeedback,
            Self::EndSession,
        ]
        .into_iter()
        .find(|command| command.word() == word)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [hi, lo] = self.word().to_be_bytes();
        write!(f, "{}{}", char::from(hi), char::from(lo))
    }
}

/// Check the signature and command of a session packet
///
/// The caller guarantees `buf` holds at least four bytes.
fn check_header(buf: &[u8], expected: Command) -> Result<(), DecodeError> {
    let signature = read_u16(buf, 0);
    if signature != SIGNATURE {
        return Err(DecodeError::InvalidSignature(signature));
    }

    let command = read_u16(buf, 2);
    if command != expected.word() {
        return Err(DecodeError::UnexpectedCommand {
            expected,
            actual: command,
        });
    }

    Ok(())
}

/// Check the protocol version word at offset 4
fn check_version(buf: &[u8]) -> Result<(), DecodeError> {
    let version = read_u32(buf, 4);
    if version == PROTOCOL_VERSION {
        Ok(())
    } else {
        Err(DecodeError::UnsupportedVersion(version))
    }
}

/// Identify the session command of a datagram without decoding it fully
///
/// Returns `None` for anything that is not an `AppleMIDI` session packet,
/// including RTP-MIDI payload packets.
#[must_use]
pub fn peek_command(buf: &[u8]) -> Option<Command> {
    if buf.len() < 4 || read_u16(buf, 0) != SIGNATURE {
        return None;
    }
    Command::from_word(read_u16(buf, 2))
}
