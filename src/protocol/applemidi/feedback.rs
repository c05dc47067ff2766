use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, check_header};
use crate::protocol::{DecodeError, read_u32};

/// `RS` receiver feedback packet
///
/// Tells the initiator the highest RTP sequence number received, so it can
/// trim its recovery journal. The sequence number occupies the upper 16 bits
/// of the 32-bit field at offset 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverFeedback {
    /// SSRC of the receiver (our local SSRC)
    pub ssrc: u32,
    /// Last RTP sequence number received
    pub sequence: u16,
}

impl ReceiverFeedback {
    /// Packet size
    pub const SIZE: usize = 12;

    /// Encode to bytes
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u16(super::SIGNATURE);
        buf.put_u16(Command::ReceiverFeedback.word());
        buf.put_u32(self.ssrc);
        buf.put_u32(u32::from(self.sequence) << 16);
        buf.freeze()
    }

    /// Decode an `RS` packet
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the buffer is too small or the signature or
    /// command do not match.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < Self::SIZE {
            return Err(DecodeError::BufferTooSmall {
                needed: Self::SIZE,
                have: buf.len(),
            });
        }

        check_header(buf, Command::ReceiverFeedback)?;

        #[allow(clippy::cast_possible_truncation)]
        let sequence = (read_u32(buf, 8) >> 16) as u16;

        Ok(Self {
            ssrc: read_u32(buf, 4),
            sequence,
        })
    }
}
