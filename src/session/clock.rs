//! Wall-clock source for expiry checks.

use time::OffsetDateTime;

/// Supplies the current UTC instant. Swapped out in tests to pin or drive time.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
