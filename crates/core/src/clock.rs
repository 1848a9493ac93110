//! Time source
//!
//! Edit coalescing and cursor blinking depend on elapsed time, so the engine
//! reads the wall clock through this trait instead of calling `Utc::now()`
//! directly.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

/// A source of timestamps
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replay
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the current wall time
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create a clock frozen at `start`
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move time forward by `millis`
    pub fn advance_ms(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }

    /// Jump to an absolute time
    pub fn set(&self, time: DateTime<Utc>) {
        self.now.set(time);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Shared handle to a clock
pub type SharedClock = Rc<dyn Clock>;

/// The default shared clock
pub fn system_clock() -> SharedClock {
    Rc::new(SystemClock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance_ms(1500);
        assert_eq!((clock.now() - start).num_milliseconds(), 1500);
    }
}
