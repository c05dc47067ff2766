use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::protocol::DecodeError;

/// Which of the participant's two sockets an error concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// Session control port (`P`)
    Control,
    /// MIDI data port (`P + 1`)
    Midi,
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Control => write!(f, "control"),
            Self::Midi => write!(f, "MIDI"),
        }
    }
}

/// Errors that can occur in an `AppleMIDI` participant
#[derive(Debug, Error)]
pub enum AppleMidiError {
    // ===== Setup Errors =====
    /// A socket could not be bound to its port
    #[error("couldn't bind to port {port}")]
    Bind {
        /// The port that was requested
        port: u16,
        /// The underlying source of the error
        #[source]
        source: io::Error,
    },

    /// The configured control port leaves no room for the MIDI port
    #[error("control port {0} has no following MIDI port")]
    InvalidPort(u16),

    // ===== Transport Errors =====
    /// Receiving from a socket failed
    #[error("{port} socket receive error")]
    Receive {
        /// The socket that failed
        port: Port,
        /// The underlying source of the error
        #[source]
        source: io::Error,
    },

    /// Sending to the peer failed
    #[error("send failure to {target}")]
    Send {
        /// Destination of the datagram
        target: SocketAddr,
        /// The underlying source of the error
        #[source]
        source: io::Error,
    },

    /// Only part of a datagram was sent
    #[error("send failure, only {sent}/{expected} bytes sent")]
    ShortWrite {
        /// Bytes written
        sent: usize,
        /// Datagram size
        expected: usize,
    },

    /// A send was requested before the peer's address was known
    #[error("no remote {0} port recorded for the session")]
    NoPeer(Port),

    // ===== Protocol Errors =====
    /// A datagram was not the packet expected in the current state
    #[error("unexpected packet: {0}")]
    Decode(#[from] DecodeError),

    /// Network I/O error
    #[error("network error: {0}")]
    Io(#[from] io::Error),
}

impl AppleMidiError {
    /// Check if this error ends the participant's task
    ///
    /// Only receive failures are fatal; everything else is logged and the
    /// session either carries on or resets.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Receive { .. })
    }
}

/// Result type alias for `AppleMIDI` operations
pub type Result<T> = std::result::Result<T, AppleMidiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppleMidiError::Bind {
            port: 5000,
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert_eq!(err.to_string(), "couldn't bind to port 5000");

        let err = AppleMidiError::ShortWrite {
            sent: 3,
            expected: 12,
        };
        assert_eq!(err.to_string(), "send failure, only 3/12 bytes sent");

        let err = AppleMidiError::Receive {
            port: Port::Midi,
            source: io::Error::from(io::ErrorKind::ConnectionReset),
        };
        assert_eq!(err.to_string(), "MIDI socket receive error");
    }

    #[test]
    fn test_error_is_fatal() {
        let receive = AppleMidiError::Receive {
            port: Port::Control,
            source: io::Error::from(io::ErrorKind::Other),
        };
        assert!(receive.is_fatal());

        assert!(!AppleMidiError::NoPeer(Port::Midi).is_fatal());
        assert!(
            !AppleMidiError::Decode(DecodeError::InvalidSignature(0x8061)).is_fatal()
        );
    }

    #[test]
    fn test_error_from_decode() {
        let err: AppleMidiError = DecodeError::UnsupportedVersion(3).into();
        assert!(matches!(err, AppleMidiError::Decode(_)));
        assert_eq!(
            err.to_string(),
            "unexpected packet: unsupported protocol version: 3"
        );
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppleMidiError>();
    }
}
