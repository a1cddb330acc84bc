//! PostgreSQL implementation of CompletionRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::cycle::TaskCompletion;
use crate::domain::foundation::{CompletionId, CycleId, DomainError, ErrorCode, LearnerId, TaskId};
use crate::ports::{CompletionGuard, CompletionRepository};

use super::db_error;
use super::rows::{CompletionRow, COMPLETION_COLUMNS};

/// PostgreSQL implementation of the CompletionRepository port.
///
/// `insert_guarded` holds the cycle row in share mode (so finalize and task
/// deletion wait) and the task row exclusively (so two completions of the
/// same task serialize).
#[derive(Clone)]
pub struct PostgresCompletionRepository {
    pool: PgPool,
}

impl PostgresCompletionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(
        &self,
        predicate: &str,
        first: &uuid::Uuid,
        second: Option<&uuid::Uuid>,
    ) -> Result<Vec<TaskCompletion>, DomainError> {
        let sql = format!(
            "SELECT {} FROM task_completions WHERE {} ORDER BY completed_at, id",
            COMPLETION_COLUMNS, predicate
        );
        let mut query = sqlx::query_as::<_, CompletionRow>(&sql).bind(first);
        if let Some(second) = second {
            query = query.bind(second);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list completions"))?;

        Ok(rows.into_iter().map(TaskCompletion::from).collect())
    }
}

#[async_trait]
impl CompletionRepository for PostgresCompletionRepository {
    async fn insert_guarded(
        &self,
        completion: &TaskCompletion,
        guard: CompletionGuard,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM weekly_cycles WHERE id = $1 FOR SHARE")
                .bind(completion.cycle_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock cycle"))?;

        if !matches!(status.as_ref(), Some((s,)) if s == "active") {
            return Err(DomainError::new(
                ErrorCode::NoActiveCycle,
                "This task is not part of an active cycle",
            ));
        }

        sqlx::query("SELECT id FROM tasks WHERE id = $1 FOR UPDATE")
            .bind(completion.task_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock task"))?
            .ok_or_else(|| DomainError::new(ErrorCode::TaskNotFound, "Task not found"))?;

        let (total, today): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE completed_at >= $3 AND completed_at < $4)
            FROM task_completions
            WHERE task_id = $1 AND learner_id = $2
            "#,
        )
        .bind(completion.task_id.as_uuid())
        .bind(completion.learner_id.as_uuid())
        .bind(guard.today.start.as_datetime())
        .bind(guard.today.end.as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count completions"))?;

        if total >= i64::from(guard.frequency_per_week) {
            return Err(DomainError::new(
                ErrorCode::FrequencyExceeded,
                "You've already completed this task the maximum times this week",
            ));
        }
        if today > 0 {
            return Err(DomainError::new(
                ErrorCode::AlreadyCompletedToday,
                "You already completed this task today. Come back tomorrow!",
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO task_completions (
                id, task_id, learner_id, cycle_id, points_awarded, tutor_approved, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(completion.id.as_uuid())
        .bind(completion.task_id.as_uuid())
        .bind(completion.learner_id.as_uuid())
        .bind(completion.cycle_id.as_uuid())
        .bind(completion.points_awarded)
        .bind(completion.approval.as_tutor_approved())
        .bind(completion.completed_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert completion"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }

    async fn find_by_id(&self, id: &CompletionId) -> Result<Option<TaskCompletion>, DomainError> {
        let row: Option<CompletionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM task_completions WHERE id = $1",
            COMPLETION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch completion"))?;

        Ok(row.map(TaskCompletion::from))
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<TaskCompletion>, DomainError> {
        self.list_where("cycle_id = $1", cycle_id.as_uuid(), None)
            .await
    }

    async fn list_for_task(
        &self,
        task_id: &TaskId,
        learner_id: &LearnerId,
    ) -> Result<Vec<TaskCompletion>, DomainError> {
        self.list_where(
            "task_id = $1 AND learner_id = $2",
            task_id.as_uuid(),
            Some(learner_id.as_uuid()),
        )
        .await
    }

    async fn list_pending_by_cycle(
        &self,
        cycle_id: &CycleId,
    ) -> Result<Vec<TaskCompletion>, DomainError> {
        self.list_where(
            "cycle_id = $1 AND tutor_approved IS NULL",
            cycle_id.as_uuid(),
            None,
        )
        .await
    }
}
