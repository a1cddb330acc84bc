//! PostgreSQL implementation of LearnerRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, LearnerId, TutorId};
use crate::domain::learner::Learner;
use crate::ports::LearnerRepository;

use super::rows::{LearnerRow, LEARNER_COLUMNS};
use super::{db_error, is_unique_violation};

/// PostgreSQL implementation of the LearnerRepository port.
///
/// The per-tutor cap is checked under a transaction-scoped advisory lock
/// keyed on the tutor, so concurrent inserts for one tutor serialize.
#[derive(Clone)]
pub struct PostgresLearnerRepository {
    pool: PgPool,
}

impl PostgresLearnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LearnerRepository for PostgresLearnerRepository {
    async fn create(&self, learner: &Learner, max_per_tutor: usize) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::uuid::text, 0))")
            .bind(learner.tutor_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock tutor"))?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM learners WHERE tutor_id = $1")
            .bind(learner.tutor_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count learners"))?;

        if usize::try_from(count).unwrap_or(usize::MAX) >= max_per_tutor {
            return Err(DomainError::new(
                ErrorCode::MaxLearnersReached,
                format!("A tutor can have at most {} learners", max_per_tutor),
            ));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO learners (id, tutor_id, display_name, pin, total_points, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(learner.id.as_uuid())
        .bind(learner.tutor_id.as_uuid())
        .bind(learner.display_name.as_str())
        .bind(learner.pin.as_str())
        .bind(learner.total_points)
        .bind(learner.created_at.as_datetime())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(DomainError::new(
                    ErrorCode::PinAlreadyUsed,
                    "Another learner already uses this PIN",
                ));
            }
            Err(e) => return Err(DomainError::database("Failed to insert learner", e)),
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }

    async fn find_by_id(&self, id: &LearnerId) -> Result<Option<Learner>, DomainError> {
        let row: Option<LearnerRow> =
            sqlx::query_as(&format!("SELECT {} FROM learners WHERE id = $1", LEARNER_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch learner"))?;

        row.map(Learner::try_from).transpose()
    }

    async fn list_by_tutor(&self, tutor_id: &TutorId) -> Result<Vec<Learner>, DomainError> {
        let rows: Vec<LearnerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM learners WHERE tutor_id = $1 ORDER BY created_at, id",
            LEARNER_COLUMNS
        ))
        .bind(tutor_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list learners"))?;

        rows.into_iter().map(Learner::try_from).collect()
    }
}
