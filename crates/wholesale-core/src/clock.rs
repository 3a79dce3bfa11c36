//! Clock abstraction.

use chrono::{DateTime, Utc};

/// Source of the timestamps stamped on events, order numbers and cart
/// activity. Tests substitute a fixed clock.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
