//! CycleStatus enum for tracking the lifecycle of weekly cycles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StateMachine, ValidationError};

/// Lifecycle status of a weekly cycle.
///
/// ```text
/// Draft ──activate──▶ Active ──sweep──▶ Review
///                       │                  │
///                       └────finalize──────┴──▶ Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    #[default]
    Draft,
    Active,
    Review,
    Completed,
}

impl CycleStatus {
    /// Returns true while tasks may not be added or removed.
    pub fn is_locked(&self) -> bool {
        matches!(self, CycleStatus::Active)
    }

    /// Returns true if a tutor may finalize the cycle from this status.
    pub fn is_finalizable(&self) -> bool {
        matches!(self, CycleStatus::Active | CycleStatus::Review)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Draft => "draft",
            CycleStatus::Active => "active",
            CycleStatus::Review => "review",
            CycleStatus::Completed => "completed",
        }
    }
}

impl StateMachine for CycleStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CycleStatus::*;
        matches!(
            (self, target),
            (Draft, Active) | (Active, Review) | (Active, Completed) | (Review, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CycleStatus::*;
        match self {
            Draft => vec![Active],
            Active => vec![Review, Completed],
            Review => vec![Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleStatus::Draft => "Draft",
            CycleStatus::Active => "Active",
            CycleStatus::Review => "Review",
            CycleStatus::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CycleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CycleStatus::Draft),
            "active" => Ok(CycleStatus::Active),
            "review" => Ok(CycleStatus::Review),
            "completed" => Ok(CycleStatus::Completed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown cycle status '{}'", other),
            )),
        }
    }
}
