//! Clock Abstraction
//!
//! Injectable time source so TTL behavior is deterministic under test.

use std::time::Instant;

// == Clock Trait ==
/// Source of the current time for TTL bookkeeping.
///
/// The cache holds a clock rather than calling `Instant::now()` directly,
/// which lets tests freeze and advance time explicitly.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

// == System Clock ==
/// Default clock backed by the system monotonic clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// == Manual Clock ==
/// Test clock that only moves when told to.
#[cfg(test)]
#[derive(Clone)]
pub struct ManualClock {
    now: std::sync::Arc<parking_lot::Mutex<Instant>>,
}

#[cfg(test)]
impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: std::sync::Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    /// Moves the clock forward by the given duration.
    pub fn advance(&self, by: std::time::Duration) {
        *self.now.lock() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
