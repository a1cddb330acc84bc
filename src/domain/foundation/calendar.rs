//! Local calendar used for day-based game rules.
//!
//! Completions are throttled per local calendar day and cycles end at the
//! local end of their last day. The calendar is a fixed UTC offset taken
//! from configuration, so "today" is the same for every request.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use super::{Timestamp, ValidationError};

/// Largest offset accepted, in minutes (UTC+14:00 / UTC-14:00).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Half-open interval `[start, end)` covering one local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DayBounds {
    /// Returns true if the instant falls inside the day.
    pub fn contains(&self, ts: &Timestamp) -> bool {
        !ts.is_before(&self.start) && ts.is_before(&self.end)
    }
}

/// Calendar in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
}

impl LocalCalendar {
    /// Creates a calendar `minutes` east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, ValidationError> {
        if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ValidationError::out_of_range(
                "utc_offset_minutes",
                -(MAX_UTC_OFFSET_MINUTES as i64),
                MAX_UTC_OFFSET_MINUTES as i64,
                minutes as i64,
            ));
        }
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            ValidationError::invalid_format("utc_offset_minutes", "offset not representable")
        })?;
        Ok(Self { offset })
    }

    /// Calendar aligned with UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Offset of this calendar in minutes east of UTC.
    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// The local date containing `now`.
    pub fn date_of(&self, now: &Timestamp) -> NaiveDate {
        now.as_datetime().with_timezone(&self.offset).date_naive()
    }

    /// Local midnight at the start of `date`, as a UTC instant.
    pub fn start_of(&self, date: NaiveDate) -> Timestamp {
        // A fixed offset has no gaps or folds, so local midnight always maps
        // to exactly one instant.
        let local_midnight = date.and_time(NaiveTime::default());
        let utc = local_midnight - Duration::seconds(self.offset.local_minus_utc() as i64);
        Timestamp::from_datetime(DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc))
    }

    /// Bounds of the local day `date`.
    pub fn day_bounds(&self, date: NaiveDate) -> DayBounds {
        let start = self.start_of(date);
        DayBounds {
            start,
            end: start.add_days(1),
        }
    }

    /// Bounds of the local day containing `now`.
    pub fn today(&self, now: &Timestamp) -> DayBounds {
        self.day_bounds(self.date_of(now))
    }

    /// Returns true once `now` is past the last instant of local day `date`.
    pub fn is_after_day(&self, date: NaiveDate, now: &Timestamp) -> bool {
        !now.is_before(&self.day_bounds(date).end)
    }
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::utc()
    }
}
