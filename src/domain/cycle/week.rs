//! CycleWeek value object: the Monday-to-Sunday span of a cycle.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Number of days between a cycle's Monday and its Sunday.
const DAYS_FROM_START_TO_END: i64 = 6;

/// A validated cycle week: starts on a Monday, ends on the Sunday six days
/// later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWeek {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl CycleWeek {
    /// Validates and creates a week.
    ///
    /// # Errors
    ///
    /// - `InvalidDay` if start is not a Monday or end is not a Sunday
    /// - `CycleLengthMismatch` if end is not exactly six days after start
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, DomainError> {
        if start_date.weekday() != Weekday::Mon {
            return Err(DomainError::new(
                ErrorCode::InvalidDay,
                "Start date must be a Monday",
            )
            .with_detail("start_date", start_date.to_string()));
        }
        if end_date.weekday() != Weekday::Sun {
            return Err(
                DomainError::new(ErrorCode::InvalidDay, "End date must be a Sunday")
                    .with_detail("end_date", end_date.to_string()),
            );
        }
        let span = end_date.signed_duration_since(start_date).num_days();
        if span != DAYS_FROM_START_TO_END {
            return Err(DomainError::new(
                ErrorCode::CycleLengthMismatch,
                "End date must be the Sunday six days after the start date",
            )
            .with_detail("days", span.to_string()));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// The week starting on the given Monday.
    pub fn starting(monday: NaiveDate) -> Result<Self, DomainError> {
        let end = monday + chrono::Duration::days(DAYS_FROM_START_TO_END);
        Self::new(monday, end)
    }

    /// Rebuilds a week from storage without re-validating it.
    pub fn reconstitute(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}
