use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, check_header, check_version};
use crate::protocol::{DecodeError, read_u32};

/// `BY` packet: the sender leaves the session
///
/// Same fixed layout as an invitation, without the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndSession {
    /// Initiator token of the session
    pub initiator_token: u32,
    /// SSRC of the leaving peer
    pub ssrc: u32,
}

impl EndSession {
    /// Packet size
    pub const SIZE: usize = 16;

    /// Decode a `BY` packet
    ///
    /// Trailing bytes after the fixed body are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the buffer is too small or the signature,
    /// command or version do not match.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < Self::SIZE {
            return Err(DecodeError::BufferTooSmall {
                needed: Self::SIZE,
                have: buf.len(),
            });
        }

        check_header(buf, Command::EndSession)?;
        check_version(buf)?;

        Ok(Self {
            initiator_token: read_u32(buf, 8),
            ssrc: read_u32(buf, 12),
        })
    }

    /// Encode to bytes
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u16(super::SIGNATURE);
        buf.put_u16(Command::EndSession.word());
        buf.put_u32(super::PROTOCOL_VERSION);
        buf.put_u32(self.initiator_token);
        buf.put_u32(self.ssrc);
        buf.freeze()
    }
}
