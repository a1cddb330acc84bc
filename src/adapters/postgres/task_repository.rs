//! PostgreSQL implementation of TaskRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::cycle::{Task, WeeklyCycle};
use crate::domain::foundation::{CycleId, DomainError, ErrorCode, TaskId};
use crate::ports::TaskRepository;

use super::db_error;
use super::rows::{CycleRow, TaskRow, CYCLE_COLUMNS, TASK_COLUMNS};

/// PostgreSQL implementation of the TaskRepository port.
///
/// Writes lock the owning cycle row so the lock state and the task caps
/// cannot change between the check and the write.
#[derive(Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_cycle(
    tx: &mut Transaction<'_, Postgres>,
    cycle_id: &CycleId,
) -> Result<WeeklyCycle, DomainError> {
    let row: Option<CycleRow> = sqlx::query_as(&format!(
        "SELECT {} FROM weekly_cycles WHERE id = $1 FOR UPDATE",
        CYCLE_COLUMNS
    ))
    .bind(cycle_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_error("Failed to lock cycle"))?;

    match row {
        Some(row) => WeeklyCycle::try_from(row),
        None => Err(DomainError::new(ErrorCode::CycleNotFound, "Weekly cycle not found")
            .with_detail("cycle_id", cycle_id.to_string())),
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let cycle = lock_cycle(&mut tx, &task.cycle_id).await?;

        let (task_count, boss_count): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_boss_task) FROM tasks WHERE cycle_id = $1",
        )
        .bind(task.cycle_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count tasks"))?;

        cycle.ensure_task_capacity(
            usize::try_from(task_count).unwrap_or(usize::MAX),
            usize::try_from(boss_count).unwrap_or(usize::MAX),
            task.is_boss_task,
        )?;

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, cycle_id, title, description, icon, expectation,
                frequency_per_week, is_boss_task, point_value, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(task.id.as_uuid())
        .bind(task.cycle_id.as_uuid())
        .bind(&task.title)
        .bind(task.description.as_deref())
        .bind(task.icon.as_deref())
        .bind(task.expectation.as_deref())
        .bind(task.frequency_per_week)
        .bind(task.is_boss_task)
        .bind(task.point_value)
        .bind(task.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert task"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch task"))?;

        Ok(row.map(Task::from))
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Task>, DomainError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tasks WHERE cycle_id = $1 ORDER BY created_at, id",
            TASK_COLUMNS
        ))
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list tasks"))?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let cycle_id: Option<(uuid::Uuid,)> =
            sqlx::query_as("SELECT cycle_id FROM tasks WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to fetch task"))?;

        let not_found = || {
            DomainError::new(ErrorCode::TaskNotFound, "Task not found")
                .with_detail("task_id", id.to_string())
        };
        let (cycle_id,) = cycle_id.ok_or_else(not_found)?;

        let cycle = lock_cycle(&mut tx, &CycleId::from_uuid(cycle_id)).await?;
        cycle.ensure_unlocked()?;

        let (has_completions,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM task_completions WHERE task_id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to check completions"))?;

        if has_completions {
            return Err(DomainError::new(
                ErrorCode::HasCompletions,
                "Tasks with completions cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete task"))?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }
}
