//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresLearnerRepository` - Learner profiles with per-tutor caps
//! - `PostgresCycleRepository` - Weekly cycles, activation and expiry sweep
//! - `PostgresTaskRepository` - Tasks, re-checking lock and caps under a row lock
//! - `PostgresCompletionRepository` - Guarded completion inserts
//! - `PostgresPointsLedger` - Approval decisions and settlement
//!
//! Cross-row invariants are enforced here, inside transactions that lock the
//! owning cycle row, so two concurrent requests can never both pass a check.

mod completion_repository;
mod cycle_repository;
mod learner_repository;
mod points_ledger;
mod rows;
mod task_repository;

pub use completion_repository::PostgresCompletionRepository;
pub use cycle_repository::PostgresCycleRepository;
pub use learner_repository::PostgresLearnerRepository;
pub use points_ledger::PostgresPointsLedger;
pub use task_repository::PostgresTaskRepository;

use crate::domain::foundation::DomainError;

/// Wraps a sqlx failure as a `DatabaseError` with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::database(context, e)
}

/// True if the error is a unique constraint violation (SQLSTATE 23505).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
