//! Clock abstraction
//!
//! All time-based transitions in Cadence (cooldown expiry, cycle reset,
//! due-item detection) are evaluated lazily against the current wall-clock
//! time. The clock is injected rather than read globally so that tests can
//! pin "now" to an exact instant.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used by the running service
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Pin the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().unwrap() = instant;
    }

    /// Move the clock forward
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.instant.lock().unwrap();
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_returns_valid_timestamp() {
        let timestamp = SystemClock.now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_fixed_clock_holds_instant() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let clock = FixedClock::new(t0);
        assert_eq!(clock.now(), t0);
        assert_eq!(clock.now(), t0);
    }

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let clock = FixedClock::new(t0);

        clock.advance(Duration::days(3));
        assert_eq!(clock.now(), t0 + Duration::days(3));

        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        clock.set(t1);
        assert_eq!(clock.now(), t1);
    }
}
