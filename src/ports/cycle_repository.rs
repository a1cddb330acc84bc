//! Weekly cycle repository port.
//!
//! At most one cycle per learner may be ACTIVE. Implementations enforce this
//! at the storage layer (unique constraint or equivalent), never with a
//! read-then-write from the application.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::cycle::WeeklyCycle;
use crate::domain::foundation::{CycleId, CycleStatus, DomainError, LearnerId, Timestamp};

#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Insert a new draft cycle.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create(&self, cycle: &WeeklyCycle) -> Result<(), DomainError>;

    /// Find a cycle by ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &CycleId) -> Result<Option<WeeklyCycle>, DomainError>;

    /// The learner's ACTIVE cycle, if any.
    async fn find_active_for_learner(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<WeeklyCycle>, DomainError>;

    /// The learner's most recent cycle in one of `statuses`.
    ///
    /// "Most recent" is the latest start date, then the latest creation time.
    async fn find_latest_for_learner(
        &self,
        learner_id: &LearnerId,
        statuses: &[CycleStatus],
    ) -> Result<Option<WeeklyCycle>, DomainError>;

    /// Atomically move a draft cycle that has at least one task to ACTIVE.
    ///
    /// # Errors
    ///
    /// - `ActiveCycleExists` if another cycle of the learner is ACTIVE
    /// - `AlreadyActive`, `NoTasks` or `InvalidStateTransition` if the
    ///   stored cycle no longer qualifies (lost race)
    /// - `CycleNotFound` if the cycle is gone
    async fn activate(&self, id: &CycleId, now: Timestamp) -> Result<WeeklyCycle, DomainError>;

    /// Move every ACTIVE cycle whose end date is before `today` to REVIEW.
    ///
    /// Idempotent and safe to run concurrently: each cycle transitions once.
    /// Returns the number of cycles moved by this call.
    async fn sweep_expired(&self, today: NaiveDate, now: Timestamp) -> Result<u64, DomainError>;
}
