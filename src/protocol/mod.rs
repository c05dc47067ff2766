//! Wire formats
//!
//! Two packet families share the participant's sockets:
//!
//! - [`applemidi`]: the Apple session protocol (invitations, clock sync,
//!   receiver feedback, end of session), identified by the `0xFFFF` signature.
//! - [`rtp`]: RTP-MIDI payload packets carrying MIDI command sections.
//!
//! Everything here is pure: decoders borrow a datagram and return a typed
//! value or a [`DecodeError`], encoders return a fresh buffer in network byte
//! order.

pub mod applemidi;
pub mod rtp;

use thiserror::Error;

/// Reasons a datagram was not accepted as the packet a decoder looks for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Datagram shorter than the fixed part of the packet
    #[error("buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes available
        have: usize,
    },

    /// Datagram length does not match a fixed-size packet
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Exact size of the packet
        expected: usize,
        /// Size of the datagram
        actual: usize,
    },

    /// First two bytes are not the `AppleMIDI` signature
    #[error("invalid signature: 0x{0:04x}")]
    InvalidSignature(u16),

    /// Command code differs from the one the decoder expects
    #[error("unexpected command: expected {expected}, got {actual}")]
    UnexpectedCommand {
        /// Expected command
        expected: applemidi::Command,
        /// Raw command word found in the datagram
        actual: u16,
    },

    /// Protocol version other than 2
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u32),

    /// RTP version bits other than 2
    #[error("invalid RTP version: {0}")]
    InvalidRtpVersion(u8),

    /// RTP header carries contributing sources
    #[error("unexpected CSRC count: {0}")]
    UnexpectedCsrc(u8),

    /// RTP payload type other than RTP-MIDI
    #[error("unexpected payload type: 0x{0:02x}")]
    UnexpectedPayloadType(u8),

    /// MIDI command section runs past the end of the datagram
    #[error("MIDI command section truncated: declared {declared} bytes, {available} available")]
    Truncated {
        /// Length announced by the section header
        declared: usize,
        /// Bytes left in the datagram
        available: usize,
    },
}

#[inline]
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[inline]
pub(crate) fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}
