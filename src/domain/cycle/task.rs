//! Task entity - one recurring chore inside a weekly cycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CycleId, TaskId, Timestamp, ValidationError};

use super::rules::{
    BOSS_TASK_POINTS, MAX_FREQUENCY_PER_WEEK, MAX_ICON_LENGTH, MAX_TASK_TEXT_LENGTH,
    MAX_TASK_TITLE_LENGTH, MIN_FREQUENCY_PER_WEEK, REGULAR_TASK_POINTS,
};

/// Validated tutor input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    title: String,
    description: Option<String>,
    icon: Option<String>,
    expectation: Option<String>,
    frequency_per_week: i32,
    is_boss_task: bool,
}

impl TaskDetails {
    /// Validates task input.
    ///
    /// Text fields are trimmed; blank optional fields become `None`.
    pub fn new(
        title: &str,
        description: Option<&str>,
        icon: Option<&str>,
        expectation: Option<&str>,
        frequency_per_week: i32,
        is_boss_task: bool,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        check_length("title", title, MAX_TASK_TITLE_LENGTH)?;

        if !(MIN_FREQUENCY_PER_WEEK..=MAX_FREQUENCY_PER_WEEK).contains(&frequency_per_week) {
            return Err(ValidationError::out_of_range(
                "frequency_per_week",
                MIN_FREQUENCY_PER_WEEK as i64,
                MAX_FREQUENCY_PER_WEEK as i64,
                frequency_per_week as i64,
            ));
        }

        Ok(Self {
            title: title.to_string(),
            description: optional_text("description", description, MAX_TASK_TEXT_LENGTH)?,
            icon: optional_text("icon", icon, MAX_ICON_LENGTH)?,
            expectation: optional_text("expectation", expectation, MAX_TASK_TEXT_LENGTH)?,
            frequency_per_week,
            is_boss_task,
        })
    }

    pub fn is_boss_task(&self) -> bool {
        self.is_boss_task
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::out_of_range(field, 0, max as i64, len as i64));
    }
    Ok(())
}

fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => {
            check_length(field, v, max)?;
            Ok(Some(v.to_string()))
        }
        None => Ok(None),
    }
}

/// A recurring task within one weekly cycle.
///
/// The point value is fixed by task kind at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub cycle_id: CycleId,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub expectation: Option<String>,
    pub frequency_per_week: i32,
    pub is_boss_task: bool,
    pub point_value: i32,
    pub created_at: Timestamp,
}

impl Task {
    /// Creates a task in the given cycle.
    pub fn new(cycle_id: CycleId, details: TaskDetails, now: Timestamp) -> Self {
        let point_value = point_value_for(details.is_boss_task);
        Self {
            id: TaskId::new(),
            cycle_id,
            title: details.title,
            description: details.description,
            icon: details.icon,
            expectation: details.expectation,
            frequency_per_week: details.frequency_per_week,
            is_boss_task: details.is_boss_task,
            point_value,
            created_at: now,
        }
    }

    /// Returns true if completions of this task count toward progress.
    pub fn is_regular(&self) -> bool {
        !self.is_boss_task
    }
}

/// Points awarded for one completion of a task of the given kind.
pub fn point_value_for(is_boss_task: bool) -> i32 {
    if is_boss_task {
        BOSS_TASK_POINTS
    } else {
        REGULAR_TASK_POINTS
    }
}
