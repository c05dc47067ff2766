//! Test doubles for the participant
//!
//! [`MockTransport`] and [`ManualClock`] drive a participant without sockets
//! or wall-clock time; [`MockInitiator`] plays the remote side over real UDP.

pub mod mock_initiator;
pub mod mock_transport;

pub use crate::clock::ManualClock;
pub use mock_initiator::{MockInitiator, MockInitiatorConfig, MockInitiatorError};
pub use mock_transport::MockTransport;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Deterministic RNG for reproducible SSRCs
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
