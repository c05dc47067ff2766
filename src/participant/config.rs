//! Participant configuration

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::clock::ticks_from_duration;

/// Default session control port
pub const DEFAULT_CONTROL_PORT: u16 = 5000;

/// Participant configuration
#[derive(Debug, Clone)]
pub struct ParticipantConfig {
    /// Session name sent to initiators in invitation answers
    pub name: String,

    /// Address both sockets bind to
    pub bind_address: IpAddr,

    /// Control port; the MIDI port is the next one
    pub control_port: u16,

    /// Silence after which a session is dropped
    pub sync_timeout: Duration,

    /// Minimum interval between receiver feedback packets
    pub feedback_period: Duration,

    /// Pause between polls in [`Participant::run`](super::Participant::run);
    /// zero only yields to the runtime
    pub poll_interval: Duration,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for ParticipantConfig {
    fn default() -> Self {
        Self {
            name: "applemidi".to_string(),
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            control_port: DEFAULT_CONTROL_PORT,
            sync_timeout: Duration::from_secs(60),
            feedback_period: Duration::from_secs(1),
            poll_interval: Duration::from_millis(1),
            event_capacity: 64,
        }
    }
}

impl ParticipantConfig {
    /// Create with custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set control port
    #[must_use]
    pub fn control_port(mut self, port: u16) -> Self {
        self.control_port = port;
        self
    }

    /// Set bind address
    #[must_use]
    pub fn bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    /// Set sync timeout
    #[must_use]
    pub fn sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    /// Set feedback period
    #[must_use]
    pub fn feedback_period(mut self, period: Duration) -> Self {
        self.feedback_period = period;
        self
    }

    /// Set poll interval
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// MIDI port, `None` if the control port is the last one
    ///
    /// A control port of 0 lets the OS pick both ports.
    #[must_use]
    pub fn midi_port(&self) -> Option<u16> {
        if self.control_port == 0 {
            return Some(0);
        }
        self.control_port.checked_add(1)
    }

    pub(crate) fn sync_timeout_ticks(&self) -> u64 {
        ticks_from_duration(self.sync_timeout)
    }

    pub(crate) fn feedback_period_ticks(&self) -> u64 {
        ticks_from_duration(self.feedback_period)
    }
}
