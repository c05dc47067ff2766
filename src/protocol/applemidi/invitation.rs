use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, check_header, check_version};
use crate::protocol::{DecodeError, read_u32};

/// Longest session name carried in an invitation, excluding the terminator
pub const MAX_NAME_LEN: usize = 255;

/// Name reported for invitations that carry none
pub const UNKNOWN_NAME: &str = "<unknown>";

/// Invitation-shaped packet (`IN`, `OK` or `NO`)
///
/// Layout:
///
/// | offset | size | field |
/// |--------|------|-------|
/// | 0 | 2 | signature `0xFFFF` |
/// | 2 | 2 | command |
/// | 4 | 4 | protocol version (2) |
/// | 8 | 4 | initiator token |
/// | 12 | 4 | sender SSRC |
/// | 16 | .. | optional nul-terminated name |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    /// `IN`, `OK` or `NO`
    pub command: Command,
    /// Token chosen by the initiator, echoed in the answer
    pub initiator_token: u32,
    /// SSRC of the sender of this packet
    pub ssrc: u32,
    /// Session name of the sender
    pub name: String,
}

impl Invitation {
    /// Size of the fixed part, before the name
    pub const HEADER_SIZE: usize = 16;

    /// Create the `OK` answer to an invitation
    #[must_use]
    pub fn accept(initiator_token: u32, ssrc: u32, name: &str) -> Self {
        Self {
            command: Command::InvitationAccepted,
            initiator_token,
            ssrc,
            name: truncate_name(name).to_string(),
        }
    }

    /// Decode an `IN` packet
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the buffer is shorter than the header or the
    /// signature, command or version do not match.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with_command(buf, Command::Invitation)
    }

    /// Decode an invitation-shaped packet carrying `command`
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the buffer is shorter than the header or the
    /// signature, command or version do not match.
    pub fn decode_with_command(buf: &[u8], command: Command) -> Result<Self, DecodeError> {
        if buf.len() < Self::HEADER_SIZE {
            return Err(DecodeError::BufferTooSmall {
                needed: Self::HEADER_SIZE,
                have: buf.len(),
            });
        }

        check_header(buf, command)?;
        check_version(buf)?;

        let name = if buf.len() > Self::HEADER_SIZE {
            let raw = &buf[Self::HEADER_SIZE..];
            let end = raw
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(raw.len())
                .min(MAX_NAME_LEN);
            String::from_utf8_lossy(&raw[..end]).into_owned()
        } else {
            UNKNOWN_NAME.to_string()
        };

        Ok(Self {
            command,
            initiator_token: read_u32(buf, 8),
            ssrc: read_u32(buf, 12),
            name,
        })
    }

    /// Encode with the name trimmed to its length plus one terminator
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let name = truncate_name(&self.name);
        let mut buf = BytesMut::with_capacity(Self::HEADER_SIZE + name.len() + 1);

        buf.put_u16(super::SIGNATURE);
        buf.put_u16(self.command.word());
        buf.put_u32(super::PROTOCOL_VERSION);
        buf.put_u32(self.initiator_token);
        buf.put_u32(self.ssrc);
        buf.put_slice(name.as_bytes());
        buf.put_u8(0);

        buf.freeze()
    }
}

/// Cut `name` to at most `MAX_NAME_LEN` bytes on a character boundary
fn truncate_name(name: &str) -> &str {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
