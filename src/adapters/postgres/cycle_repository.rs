//! PostgreSQL implementation of CycleRepository.
//!
//! The partial unique index `weekly_cycles_one_active_idx` is the source of
//! truth for "one active cycle per learner"; activation maps its violation
//! to `ActiveCycleExists`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::cycle::WeeklyCycle;
use crate::domain::foundation::{
    CycleId, CycleStatus, DomainError, ErrorCode, LearnerId, Timestamp,
};
use crate::ports::CycleRepository;

use super::rows::{CycleRow, CYCLE_COLUMNS};
use super::{db_error, is_unique_violation};

/// PostgreSQL implementation of the CycleRepository port.
#[derive(Clone)]
pub struct PostgresCycleRepository {
    pool: PgPool,
}

impl PostgresCycleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CycleRepository for PostgresCycleRepository {
    async fn create(&self, cycle: &WeeklyCycle) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO weekly_cycles (
                id, learner_id, start_date, end_date, status,
                tutor_reviewed_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(cycle.id().as_uuid())
        .bind(cycle.learner_id().as_uuid())
        .bind(cycle.start_date())
        .bind(cycle.end_date())
        .bind(cycle.status().as_str())
        .bind(cycle.tutor_reviewed_at().map(|t| *t.as_datetime()))
        .bind(cycle.created_at().as_datetime())
        .bind(cycle.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert cycle"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CycleId) -> Result<Option<WeeklyCycle>, DomainError> {
        let row: Option<CycleRow> =
            sqlx::query_as(&format!("SELECT {} FROM weekly_cycles WHERE id = $1", CYCLE_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch cycle"))?;

        row.map(WeeklyCycle::try_from).transpose()
    }

    async fn find_active_for_learner(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<WeeklyCycle>, DomainError> {
        let row: Option<CycleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM weekly_cycles WHERE learner_id = $1 AND status = 'active'",
            CYCLE_COLUMNS
        ))
        .bind(learner_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch active cycle"))?;

        row.map(WeeklyCycle::try_from).transpose()
    }

    async fn find_latest_for_learner(
        &self,
        learner_id: &LearnerId,
        statuses: &[CycleStatus],
    ) -> Result<Option<WeeklyCycle>, DomainError> {
        let statuses: Vec<&'static str> = statuses.iter().map(CycleStatus::as_str).collect();
        let row: Option<CycleRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM weekly_cycles
            WHERE learner_id = $1 AND status = ANY($2)
            ORDER BY start_date DESC, created_at DESC
            LIMIT 1
            "#,
            CYCLE_COLUMNS
        ))
        .bind(learner_id.as_uuid())
        .bind(statuses)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch latest cycle"))?;

        row.map(WeeklyCycle::try_from).transpose()
    }

    async fn activate(&self, id: &CycleId, now: Timestamp) -> Result<WeeklyCycle, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let row: Option<CycleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM weekly_cycles WHERE id = $1 FOR UPDATE",
            CYCLE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock cycle"))?;

        let mut cycle = match row {
            Some(row) => WeeklyCycle::try_from(row)?,
            None => {
                return Err(DomainError::new(ErrorCode::CycleNotFound, "Weekly cycle not found")
                    .with_detail("cycle_id", id.to_string()))
            }
        };

        let (task_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE cycle_id = $1")
            .bind(id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count tasks"))?;

        cycle.activate(usize::try_from(task_count).unwrap_or(0), now)?;

        let result = sqlx::query(
            "UPDATE weekly_cycles SET status = $2, updated_at = $3 WHERE id = $1 AND status = 'draft'",
        )
        .bind(id.as_uuid())
        .bind(CycleStatus::Active.as_str())
        .bind(now.as_datetime())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(DomainError::new(
                    ErrorCode::ActiveCycleExists,
                    "This learner already has an active cycle",
                ));
            }
            Err(e) => return Err(DomainError::database("Failed to activate cycle", e)),
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok(cycle)
    }

    async fn sweep_expired(&self, today: NaiveDate, now: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE weekly_cycles
            SET status = 'review', updated_at = $2
            WHERE status = 'active' AND end_date < $1
            "#,
        )
        .bind(today)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to sweep expired cycles"))?;

        Ok(result.rows_affected())
    }
}
