//! DeleteTaskHandler - Command handler for removing a task.

use std::sync::Arc;

use tracing::info;

use crate::application::handlers::access::cycle_for_tutor;
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, TaskId};
use crate::ports::{CycleRepository, LearnerRepository, TaskRepository};

#[derive(Debug, Clone)]
pub struct DeleteTaskCommand {
    pub task_id: TaskId,
}

/// Removes a task unless its cycle is active or it already has completions.
pub struct DeleteTaskHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl DeleteTaskHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        Self {
            cycles,
            learners,
            tasks,
        }
    }

    pub async fn handle(
        &self,
        cmd: DeleteTaskCommand,
        metadata: CommandMetadata,
    ) -> Result<(), DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        let task = self.tasks.find_by_id(&cmd.task_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::TaskNotFound, "Task not found")
                .with_detail("task_id", cmd.task_id.to_string())
        })?;

        let cycle = cycle_for_tutor(
            self.cycles.as_ref(),
            self.learners.as_ref(),
            &tutor_id,
            &task.cycle_id,
        )
        .await?;
        cycle.ensure_unlocked()?;

        // Storage re-checks the lock and the completion count atomically.
        self.tasks.delete(&cmd.task_id).await?;

        info!(task_id = %cmd.task_id, cycle_id = %task.cycle_id, "task deleted");
        Ok(())
    }
}
