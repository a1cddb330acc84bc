//! Task repository port.

use async_trait::async_trait;

use crate::domain::cycle::Task;
use crate::domain::foundation::{CycleId, DomainError, TaskId};

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a task, re-checking the cycle lock and task caps atomically.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound`, `CycleLocked`
    /// - `MaxTasksReached`, `MaxBossTasksReached`
    /// - `DatabaseError` on persistence failure
    async fn create(&self, task: &Task) -> Result<(), DomainError>;

    /// Find a task by ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, DomainError>;

    /// All tasks of a cycle, in creation order.
    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Task>, DomainError>;

    /// Delete a task unless its cycle is ACTIVE or it has completions.
    ///
    /// # Errors
    ///
    /// - `TaskNotFound`, `CycleLocked`, `HasCompletions`
    /// - `DatabaseError` on persistence failure
    async fn delete(&self, id: &TaskId) -> Result<(), DomainError>;
}
