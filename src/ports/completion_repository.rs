//! Task completion repository port.

use async_trait::async_trait;

use crate::domain::cycle::TaskCompletion;
use crate::domain::foundation::{
    CompletionId, CycleId, DayBounds, DomainError, LearnerId, TaskId,
};

/// Limits re-checked by storage when a completion is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionGuard {
    /// Weekly cap for this learner on this task.
    pub frequency_per_week: i32,
    /// The local day the completion falls on.
    pub today: DayBounds,
}

#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Insert a completion while holding the task exclusively.
    ///
    /// Closes the race between two near-simultaneous requests: both may pass
    /// the handler's checks, but only one insert succeeds.
    ///
    /// # Errors
    ///
    /// - `NoActiveCycle` if the cycle left ACTIVE meanwhile
    /// - `FrequencyExceeded` if the weekly cap is reached
    /// - `AlreadyCompletedToday` if a completion exists in `guard.today`
    /// - `DatabaseError` on persistence failure
    async fn insert_guarded(
        &self,
        completion: &TaskCompletion,
        guard: CompletionGuard,
    ) -> Result<(), DomainError>;

    /// Find a completion by ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &CompletionId) -> Result<Option<TaskCompletion>, DomainError>;

    /// All completions recorded in a cycle, oldest first.
    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<TaskCompletion>, DomainError>;

    /// This learner's completions of one task, oldest first.
    async fn list_for_task(
        &self,
        task_id: &TaskId,
        learner_id: &LearnerId,
    ) -> Result<Vec<TaskCompletion>, DomainError>;

    /// Completions still awaiting review in a cycle, oldest first.
    async fn list_pending_by_cycle(
        &self,
        cycle_id: &CycleId,
    ) -> Result<Vec<TaskCompletion>, DomainError>;
}
