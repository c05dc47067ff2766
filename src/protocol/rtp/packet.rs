use bytes::{BufMut, Bytes, BytesMut};

use super::constants::{PAYLOAD_TYPE, RTP_VERSION};
use super::sysex::{self, Segment};
use crate::protocol::{DecodeError, read_u16, read_u32};

/// RTP header (12 bytes, no CSRC list)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeader {
    /// Version (2 bits, always 2)
    pub version: u8,
    /// Padding flag
    pub padding: bool,
    /// Extension flag
    pub extension: bool,
    /// CSRC count (4 bits)
    pub csrc_count: u8,
    /// Marker bit
    pub marker: bool,
    /// Payload type (7 bits)
    pub payload_type: u8,
    /// Sequence number (16 bits)
    pub sequence: u16,
    /// Timestamp (32 bits)
    pub timestamp: u32,
    /// Synchronization source ID (32 bits)
    pub ssrc: u32,
}

impl RtpHeader {
    /// Standard RTP header size
    pub const SIZE: usize = 12;

    /// Create a RTP-MIDI header
    #[must_use]
    pub fn new_midi(sequence: u16, timestamp: u32, ssrc: u32) -> Self {
        Self {
            version: RTP_VERSION,
            padding: false,
            extension: false,
            csrc_count: 0,
            marker: false,
            payload_type: PAYLOAD_TYPE,
            sequence,
            timestamp,
            ssrc,
        }
    }

    /// Encode header to bytes
    #[must_use]
    pub fn encode(&self) -> [u8; 12] {
        let mut buf = [0u8; 12];

        // Byte 0: V(2) | P(1) | X(1) | CC(4)
        buf[0] = (self.version << 6)
            | (u8::from(self.padding) << 5)
            | (u8::from(self.extension) << 4)
            | (self.csrc_count & 0x0F);

        // Byte 1: M(1) | PT(7)
        buf[1] = (u8::from(self.marker) << 7) | (self.payload_type & 0x7F);

        buf[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        buf[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        buf[8..12].copy_from_slice(&self.ssrc.to_be_bytes());

        buf
    }

    /// Decode a RTP-MIDI header
    ///
    /// The 16-bit flags word must carry version 2, no CSRCs and payload type
    /// `0x61` in its low byte (marker bit included, as `AppleMIDI` peers send
    /// it clear).
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the buffer is too small or any of the three
    /// flag checks fails.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < Self::SIZE {
            return Err(DecodeError::BufferTooSmall {
                needed: Self::SIZE,
                have: buf.len(),
            });
        }

        let flags = read_u16(buf, 0);

        #[allow(clippy::cast_possible_truncation)]
        let version = ((flags >> 14) & 0x03) as u8;
        if version != RTP_VERSION {
            return Err(DecodeError::InvalidRtpVersion(version));
        }

        #[allow(clippy::cast_possible_truncation)]
        let csrc_count = ((flags >> 8) & 0x0F) as u8;
        if csrc_count != 0 {
            return Err(DecodeError::UnexpectedCsrc(csrc_count));
        }

        let low = buf[1];
        if low != PAYLOAD_TYPE {
            return Err(DecodeError::UnexpectedPayloadType(low));
        }

        Ok(Self {
            version,
            padding: (buf[0] >> 5) & 0x01 != 0,
            extension: (buf[0] >> 4) & 0x01 != 0,
            csrc_count,
            marker: low & 0x80 != 0,
            payload_type: low & 0x7F,
            sequence: read_u16(buf, 2),
            timestamp: read_u32(buf, 4),
            ssrc: read_u32(buf, 8),
        })
    }
}

/// MIDI command section header (RFC 6295 §3.1)
///
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |B|J|Z|P|  LEN  |   (B clear: 4-bit length)
/// +-+-+-+-+-+-+-+-+
/// |B|J|Z|P|  LEN  |      LEN      |   (B set: 12-bit length)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandSectionHeader {
    /// A recovery journal follows the command list
    pub journal: bool,
    /// First command carries a delta time
    pub delta_time_first: bool,
    /// First command's status byte was omitted (running status)
    pub phantom: bool,
    /// Length of the command list in bytes
    pub length: u16,
}

impl CommandSectionHeader {
    /// Longest command list a 4-bit header can describe
    pub const SHORT_MAX: u16 = 0x0F;

    /// Longest command list a 12-bit header can describe
    pub const LONG_MAX: u16 = 0x0FFF;

    /// Decode from the start of `buf`, returning the header and its size
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::BufferTooSmall` if a long header is cut short.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        let Some(&first) = buf.first() else {
            return Err(DecodeError::BufferTooSmall { needed: 1, have: 0 });
        };

        let mut length = u16::from(first & 0x0F);
        let mut size = 1;

        if first & 0x80 != 0 {
            let Some(&low) = buf.get(1) else {
                return Err(DecodeError::BufferTooSmall { needed: 2, have: 1 });
            };
            length = (length << 8) | u16::from(low);
            size = 2;
        }

        Ok((
            Self {
                journal: first & 0x40 != 0,
                delta_time_first: first & 0x20 != 0,
                phantom: first & 0x10 != 0,
                length,
            },
            size,
        ))
    }

    /// Encode, choosing the short form whenever the length fits in 4 bits
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let flags = (u8::from(self.journal) << 6)
            | (u8::from(self.delta_time_first) << 5)
            | (u8::from(self.phantom) << 4);
        let [high, low] = self.length.min(Self::LONG_MAX).to_be_bytes();

        if self.length > Self::SHORT_MAX {
            vec![0x80 | flags | high, low]
        } else {
            vec![flags | low]
        }
    }
}

/// Decoded RTP-MIDI packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiPacket {
    /// RTP header
    pub header: RtpHeader,
    /// Command section header
    pub section: CommandSectionHeader,
    /// Raw MIDI command list, exactly `section.length` bytes
    pub commands: Bytes,
}

impl MidiPacket {
    /// Smallest datagram that can hold a header and a command section header
    pub const MIN_SIZE: usize = RtpHeader::SIZE + 1;

    /// Build a packet around a MIDI command list
    #[must_use]
    pub fn new(sequence: u16, timestamp: u32, ssrc: u32, commands: impl Into<Bytes>) -> Self {
        let commands = commands.into();
        #[allow(clippy::cast_possible_truncation)]
        let length = commands.len().min(usize::from(CommandSectionHeader::LONG_MAX)) as u16;
        Self {
            header: RtpHeader::new_midi(sequence, timestamp, ssrc),
            section: CommandSectionHeader {
                length,
                ..CommandSectionHeader::default()
            },
            commands: commands.slice(..usize::from(length)),
        }
    }

    /// Decode a RTP-MIDI datagram
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the header is invalid or the command list is
    /// longer than the bytes left in the datagram.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < Self::MIN_SIZE {
            return Err(DecodeError::BufferTooSmall {
                needed: Self::MIN_SIZE,
                have: buf.len(),
            });
        }

        let header = RtpHeader::decode(buf)?;
        let (section, section_size) = CommandSectionHeader::decode(&buf[RtpHeader::SIZE..])?;

        let start = RtpHeader::SIZE + section_size;
        let declared = usize::from(section.length);
        let available = buf.len() - start;
        if declared > available {
            return Err(DecodeError::Truncated {
                declared,
                available,
            });
        }

        Ok(Self {
            header,
            section,
            commands: Bytes::copy_from_slice(&buf[start..start + declared]),
        })
    }

    /// Encode to bytes (without a recovery journal)
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let section = self.section.encode();
        let mut buf =
            BytesMut::with_capacity(RtpHeader::SIZE + section.len() + self.commands.len());
        buf.put_slice(&self.header.encode());
        buf.put_slice(&section);
        buf.put_slice(&self.commands);
        buf.freeze()
    }

    /// Where the deliverable bytes sit within the command list
    #[must_use]
    pub fn segment(&self) -> Segment {
        sysex::segment_of(&self.commands)
    }

    /// The command list with SysEx segmentation markers stripped
    ///
    /// Empty when the command list is empty.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.segment().apply(&self.commands)
    }
}
