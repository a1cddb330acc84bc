//! Row types and their conversion into domain entities.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::cycle::{ApprovalState, CycleWeek, Task, TaskCompletion, WeeklyCycle};
use crate::domain::foundation::{
    CompletionId, CycleId, CycleStatus, DomainError, LearnerId, TaskId, Timestamp, TutorId,
};
use crate::domain::learner::{DisplayName, Learner, Pin};

pub(super) const LEARNER_COLUMNS: &str =
    "id, tutor_id, display_name, pin, total_points, created_at";

pub(super) const CYCLE_COLUMNS: &str =
    "id, learner_id, start_date, end_date, status, tutor_reviewed_at, created_at, updated_at";

pub(super) const TASK_COLUMNS: &str = "id, cycle_id, title, description, icon, expectation, \
     frequency_per_week, is_boss_task, point_value, created_at";

pub(super) const COMPLETION_COLUMNS: &str =
    "id, task_id, learner_id, cycle_id, points_awarded, tutor_approved, completed_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct LearnerRow {
    id: Uuid,
    tutor_id: Uuid,
    display_name: String,
    pin: String,
    total_points: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<LearnerRow> for Learner {
    type Error = DomainError;

    fn try_from(row: LearnerRow) -> Result<Self, Self::Error> {
        Ok(Learner {
            id: LearnerId::from_uuid(row.id),
            tutor_id: TutorId::from_uuid(row.tutor_id),
            display_name: DisplayName::new(&row.display_name)?,
            pin: Pin::new(&row.pin)?,
            total_points: row.total_points,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CycleRow {
    id: Uuid,
    learner_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    tutor_reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CycleRow> for WeeklyCycle {
    type Error = DomainError;

    fn try_from(row: CycleRow) -> Result<Self, Self::Error> {
        let status: CycleStatus = row.status.parse()?;
        Ok(WeeklyCycle::reconstitute(
            CycleId::from_uuid(row.id),
            LearnerId::from_uuid(row.learner_id),
            CycleWeek::reconstitute(row.start_date, row.end_date),
            status,
            row.tutor_reviewed_at.map(Timestamp::from_datetime),
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TaskRow {
    id: Uuid,
    cycle_id: Uuid,
    title: String,
    description: Option<String>,
    icon: Option<String>,
    expectation: Option<String>,
    frequency_per_week: i32,
    is_boss_task: bool,
    point_value: i32,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: TaskId::from_uuid(row.id),
            cycle_id: CycleId::from_uuid(row.cycle_id),
            title: row.title,
            description: row.description,
            icon: row.icon,
            expectation: row.expectation,
            frequency_per_week: row.frequency_per_week,
            is_boss_task: row.is_boss_task,
            point_value: row.point_value,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CompletionRow {
    id: Uuid,
    task_id: Uuid,
    learner_id: Uuid,
    cycle_id: Uuid,
    points_awarded: i32,
    tutor_approved: Option<bool>,
    completed_at: DateTime<Utc>,
}

impl From<CompletionRow> for TaskCompletion {
    fn from(row: CompletionRow) -> Self {
        TaskCompletion {
            id: CompletionId::from_uuid(row.id),
            task_id: TaskId::from_uuid(row.task_id),
            learner_id: LearnerId::from_uuid(row.learner_id),
            cycle_id: CycleId::from_uuid(row.cycle_id),
            points_awarded: row.points_awarded,
            approval: ApprovalState::from_tutor_approved(row.tutor_approved),
            completed_at: Timestamp::from_datetime(row.completed_at),
        }
    }
}
