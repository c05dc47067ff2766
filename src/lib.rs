//! # applemidi
//!
//! An `AppleMIDI` (RTP-MIDI) session participant.
//!
//! ## Features
//!
//! - Accepts sessions from a single initiator on a control/MIDI port pair
//! - Answers clock synchronization and reports received sequence numbers
//! - Forwards received MIDI data, with SysEx segments reassembled by marker
//! - Drops the session when the initiator goes silent
//!
//! ## Example
//!
//! ```rust,no_run
//! use applemidi::{Participant, ParticipantConfig};
//!
//! # async fn example() -> Result<(), applemidi::AppleMidiError> {
//! let config = ParticipantConfig::with_name("synth").control_port(5004);
//! let mut participant = Participant::bind(config, |data: &[u8]| {
//!     println!("MIDI: {data:02x?}");
//! })
//! .await?;
//!
//! participant.run().await
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Participant**: [`Participant`] - session state machine, polled or run
//! - **Protocol**: [`protocol`] - session and RTP-MIDI packet codecs
//! - **Transport**: [`net`] - non-blocking datagram seam over tokio sockets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Sync clock
pub mod clock;
/// Error types
pub mod error;
/// Session participant
pub mod participant;

/// Testing utilities
pub mod testing;

pub mod net;
pub mod protocol;

// Re-exports
pub use clock::{Clock, SyncClock};
pub use error::{AppleMidiError, Result};
pub use participant::{
    EndReason, MidiHandler, Participant, ParticipantConfig, ParticipantEvent, PollStatus,
    Session, SessionState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AppleMidiError, EndReason, MidiHandler, Participant, ParticipantConfig,
        ParticipantEvent, PollStatus, SessionState,
    };
}
