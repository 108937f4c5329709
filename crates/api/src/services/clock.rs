//! Time source.

use chrono::{DateTime, Utc};

/// Supplies the current time.
///
/// OTP expiry and the "today" of the dashboard read the clock through this
/// trait so tests can move time forward.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
