//! Injectable Clock
//!
//! Time-dependent logic (lockout windows, session expiry, verification
//! deadlines) reads the current time through the [`Clock`] trait so tests
//! can move time forward deterministically.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time
///
/// Object-safe so it can be stored as `Arc<dyn Clock>` in application state.
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually controlled clock for tests
///
/// Starts at a fixed instant and only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the current system time
    pub fn from_system() -> Self {
        Self::new(Utc::now())
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }

    /// Jump the clock to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
