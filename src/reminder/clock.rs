//! Elapsed-seconds clock source.
//!
//! Every call to [`Clock::observe`] starts a new, independent observation
//! counting 0, 1, 2, ... once per period. Nothing is shared between
//! observations; dropping one cancels it.

use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

/// Default clock period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Produces elapsed-seconds observations.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    period: Duration,
}

impl Clock {
    /// Creates a 1 Hz clock.
    pub fn new() -> Self {
        Self::with_period(DEFAULT_PERIOD)
    }

    /// Creates a clock with a custom period.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn with_period(period: Duration) -> Self {
        assert!(!period.is_zero(), "clock period must be non-zero");
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts a fresh observation at elapsed = 0.
    pub fn observe(&self) -> Observation {
        let mut ticker = interval(self.period);
        // Late ticks are delivered in a burst so no value, in particular a zero-crossing, is lost.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Observation { ticker, next: 0 }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// A single running observation of a [`Clock`].
#[derive(Debug)]
pub struct Observation {
    ticker: Interval,
    next: u64,
}

impl Observation {
    /// Waits for the next tick and returns the elapsed count.
    ///
    /// The first call completes immediately with 0. Cancel safe: a dropped
    /// call does not consume a value.
    pub async fn next_elapsed(&mut self) -> u64 {
        self.ticker.tick().await;
        let elapsed = self.next;
        self.next += 1;
        elapsed
    }
}
