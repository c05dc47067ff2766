//! Sync clock in 100 µs units
//!
//! `AppleMIDI` timestamps count ticks of 100 microseconds. The participant
//! only ever compares differences of this counter, so its epoch is simply the
//! first time the clock is read.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// Microseconds per sync clock tick
pub const MICROS_PER_TICK: u64 = 100;

/// Convert a duration to sync clock ticks, saturating
#[must_use]
pub fn ticks_from_duration(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros() / u128::from(MICROS_PER_TICK)).unwrap_or(u64::MAX)
}

/// Monotonic time source in sync clock ticks
pub trait Clock: Send {
    /// Ticks elapsed since the clock's epoch
    fn now(&self) -> u64;
}

/// Sync clock driven by the runtime's monotonic timer
///
/// Built on `tokio::time::Instant`, so a paused test runtime controls it.
#[derive(Debug, Default)]
pub struct SyncClock {
    epoch: OnceLock<Instant>,
}

impl SyncClock {
    /// Create a clock; its epoch is latched on the first read
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SyncClock {
    fn now(&self) -> u64 {
        let epoch = *self.epoch.get_or_init(Instant::now);
        ticks_from_duration(Instant::now().saturating_duration_since(epoch))
    }
}

/// Manually advanced clock, shared between clones
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tick count
    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::Release);
    }

    /// Advance by a number of ticks
    pub fn advance(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::AcqRel);
    }

    /// Advance by a duration
    pub fn advance_by(&self, duration: Duration) {
        self.advance(ticks_from_duration(duration));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_from_duration() {
        assert_eq!(ticks_from_duration(Duration::from_secs(1)), 10_000);
        assert_eq!(ticks_from_duration(Duration::from_secs(60)), 600_000);
        assert_eq!(ticks_from_duration(Duration::from_micros(99)), 0);
        assert_eq!(ticks_from_duration(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(5);
        handle.advance_by(Duration::from_millis(1));
        assert_eq!(clock.now(), 15);

        handle.set(2);
        assert_eq!(clock.now(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_clock_epoch_on_first_read() {
        let clock = SyncClock::new();
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(clock.now(), 0);

        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(clock.now(), 2_500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_clock_monotonic() {
        let clock = SyncClock::new();
        let mut last = clock.now();
        for _ in 0..10 {
            tokio::time::advance(Duration::from_micros(150)).await;
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 15);
    }
}
