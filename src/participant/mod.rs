//! `AppleMIDI` session participant
//!
//! Accepts sessions from one initiator at a time and forwards the MIDI data
//! it receives.

pub mod config;
pub mod events;
mod handler;
pub mod session;
mod state_machine;

#[cfg(test)]
mod tests;

pub use config::ParticipantConfig;
pub use events::{EndReason, ParticipantEvent};
pub use handler::MidiHandler;
pub use session::{Session, SessionState};
pub use state_machine::{Participant, PollStatus, RECV_BUFFER_SIZE};
