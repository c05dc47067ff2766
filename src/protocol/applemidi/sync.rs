use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, check_header};
use crate::protocol::{DecodeError, read_u32, read_u64};

/// `CK` clock synchronization packet
///
/// Three packets make one exchange: the initiator sends count 0 with `t0`,
/// the participant answers count 1 with `t0, t1`, the initiator closes with
/// count 2 carrying `t0, t1, t2`.
///
/// | offset | size | field |
/// |--------|------|-------|
/// | 0 | 2 | signature |
/// | 2 | 2 | `CK` |
/// | 4 | 4 | sender SSRC |
/// | 8 | 1 | count |
/// | 9 | 3 | padding |
/// | 12 | 8 × 3 | timestamps (100 µs units) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPacket {
    /// SSRC of the sender
    pub ssrc: u32,
    /// Step of the exchange (0, 1 or 2)
    pub count: u8,
    /// Timestamps; only the first `count + 1` are meaningful
    pub timestamps: [u64; 3],
}

impl SyncPacket {
    /// Packet size
    pub const SIZE: usize = 36;

    /// Create the count 1 answer to a count 0 packet
    #[must_use]
    pub fn reply(ssrc: u32, t0: u64, t1: u64) -> Self {
        Self {
            ssrc,
            count: 1,
            timestamps: [t0, t1, 0],
        }
    }

    /// Decode a `CK` packet
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the buffer is not exactly 36 bytes or the
    /// signature or command do not match.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() != Self::SIZE {
            return Err(DecodeError::InvalidLength {
                expected: Self::SIZE,
                actual: buf.len(),
            });
        }

        check_header(buf, Command::Sync)?;

        Ok(Self {
            ssrc: read_u32(buf, 4),
            count: buf[8],
            timestamps: [read_u64(buf, 12), read_u64(buf, 20), read_u64(buf, 28)],
        })
    }

    /// Encode to bytes
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u16(super::SIGNATURE);
        buf.put_u16(Command::Sync.word());
        buf.put_u32(self.ssrc);
        buf.put_u8(self.count);
        buf.put_bytes(0, 3);
        for timestamp in self.timestamps {
            buf.put_u64(timestamp);
        }
        buf.freeze()
    }

    /// Offset of the initiator clock relative to ours, from a count 2 packet
    ///
    /// `((t2 + t0) / 2) - t1`, with truncating division. The sum is taken in
    /// 128 bits so large timestamps cannot overflow.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn offset_estimate(&self) -> i64 {
        let [t0, t1, t2] = self.timestamps;
        let midpoint = (u128::from(t2) + u128::from(t0)) / 2;
        let offset = midpoint as i128 - i128::from(t1);
        offset.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}
