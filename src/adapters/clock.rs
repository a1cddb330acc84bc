//! Clock adapters.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and local demos to walk through a week.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn at_rfc3339(value: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self::new(parse_rfc3339(value)?))
    }

    pub fn set(&self, to: Timestamp) {
        match self.now.write() {
            Ok(mut now) => *now = to,
            Err(poisoned) => *poisoned.into_inner() = to,
        }
    }

    pub fn set_rfc3339(&self, value: &str) -> Result<(), chrono::ParseError> {
        self.set(parse_rfc3339(value)?);
        Ok(())
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.set(self.now().add_minutes(minutes));
    }

    pub fn advance_days(&self, days: i64) {
        self.set(self.now().add_days(days));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        match self.now.read() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

fn parse_rfc3339(value: &str) -> Result<Timestamp, chrono::ParseError> {
    Ok(Timestamp::from_datetime(
        DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_rfc3339("2024-01-15T08:00:00Z").unwrap();
        clock.advance_days(1);
        clock.advance_minutes(30);
        assert_eq!(
            clock.now(),
            ManualClock::at_rfc3339("2024-01-16T08:30:00Z").unwrap().now()
        );
    }

    #[test]
    fn manual_clock_rejects_bad_input() {
        assert!(ManualClock::at_rfc3339("yesterday").is_err());
    }

    #[test]
    fn system_clock_is_close_to_now() {
        let before = Timestamp::now();
        let now = SystemClock.now();
        assert!(!now.is_before(&before));
    }
}
