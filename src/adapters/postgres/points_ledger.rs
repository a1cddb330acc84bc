//! PostgreSQL implementation of PointsLedger.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::cycle::{TaskCompletion, WeeklyCycle};
use crate::domain::foundation::{CompletionId, CycleId, DomainError, ErrorCode, Timestamp};
use crate::ports::{CycleSettlement, PointsLedger};

use super::db_error;
use super::rows::{CompletionRow, CycleRow, COMPLETION_COLUMNS, CYCLE_COLUMNS};

/// PostgreSQL implementation of the PointsLedger port.
///
/// Approval flags and the learner's lifetime total always change in the
/// same transaction.
#[derive(Clone)]
pub struct PostgresPointsLedger {
    pool: PgPool,
}

impl PostgresPointsLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PointsLedger for PostgresPointsLedger {
    async fn review_completion(
        &self,
        id: &CompletionId,
        approved: bool,
    ) -> Result<TaskCompletion, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let row: Option<CompletionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM task_completions WHERE id = $1 FOR UPDATE",
            COMPLETION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock completion"))?;

        let mut completion = row.map(TaskCompletion::from).ok_or_else(|| {
            DomainError::new(ErrorCode::CompletionNotFound, "Completion not found")
                .with_detail("completion_id", id.to_string())
        })?;

        let credit = completion.review(approved)?;

        sqlx::query("UPDATE task_completions SET tutor_approved = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(approved)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to record review"))?;

        if credit > 0 {
            sqlx::query("UPDATE learners SET total_points = total_points + $2 WHERE id = $1")
                .bind(completion.learner_id.as_uuid())
                .bind(i64::from(credit))
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to credit points"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok(completion)
    }

    async fn settle_cycle(
        &self,
        cycle_id: &CycleId,
        reviewed_at: Timestamp,
    ) -> Result<CycleSettlement, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let row: Option<CycleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM weekly_cycles WHERE id = $1 FOR UPDATE",
            CYCLE_COLUMNS
        ))
        .bind(cycle_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock cycle"))?;

        let mut cycle = match row {
            Some(row) => WeeklyCycle::try_from(row)?,
            None => {
                return Err(DomainError::new(ErrorCode::CycleNotFound, "Weekly cycle not found")
                    .with_detail("cycle_id", cycle_id.to_string()))
            }
        };
        cycle.finalize(reviewed_at)?;

        let awarded: Vec<(i32,)> = sqlx::query_as(
            r#"
            UPDATE task_completions
            SET tutor_approved = TRUE
            WHERE cycle_id = $1 AND tutor_approved IS NULL
            RETURNING points_awarded
            "#,
        )
        .bind(cycle_id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to auto-approve completions"))?;

        let auto_approved = u32::try_from(awarded.len()).unwrap_or(u32::MAX);
        let points_awarded: i64 = awarded.iter().map(|(p,)| i64::from(*p)).sum();

        if points_awarded > 0 {
            sqlx::query("UPDATE learners SET total_points = total_points + $2 WHERE id = $1")
                .bind(cycle.learner_id().as_uuid())
                .bind(points_awarded)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to credit points"))?;
        }

        sqlx::query(
            r#"
            UPDATE weekly_cycles
            SET status = $2, tutor_reviewed_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(cycle_id.as_uuid())
        .bind(cycle.status().as_str())
        .bind(reviewed_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to complete cycle"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok(CycleSettlement {
            auto_approved,
            points_awarded,
        })
    }
}
