//! AddTaskHandler - Command handler for adding a task to a cycle.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::handlers::access::cycle_for_tutor;
use crate::domain::cycle::{Task, TaskDetails};
use crate::domain::foundation::{CommandMetadata, CycleId, DomainError};
use crate::ports::{Clock, CycleRepository, LearnerRepository, TaskRepository};

/// Command to add a task.
#[derive(Debug, Clone)]
pub struct AddTaskCommand {
    pub cycle_id: CycleId,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub expectation: Option<String>,
    pub frequency_per_week: i32,
    pub is_boss_task: bool,
}

pub struct AddTaskHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    tasks: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
}

impl AddTaskHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        tasks: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            learners,
            tasks,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: AddTaskCommand,
        metadata: CommandMetadata,
    ) -> Result<Task, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        let details = TaskDetails::new(
            &cmd.title,
            cmd.description.as_deref(),
            cmd.icon.as_deref(),
            cmd.expectation.as_deref(),
            cmd.frequency_per_week,
            cmd.is_boss_task,
        )?;

        let cycle = cycle_for_tutor(
            self.cycles.as_ref(),
            self.learners.as_ref(),
            &tutor_id,
            &cmd.cycle_id,
        )
        .await?;

        let existing = self.tasks.list_by_cycle(&cmd.cycle_id).await?;
        let boss_count = existing.iter().filter(|t| t.is_boss_task).count();
        if let Err(err) =
            cycle.ensure_task_capacity(existing.len(), boss_count, details.is_boss_task())
        {
            debug!(cycle_id = %cmd.cycle_id, code = %err.code, "task rejected");
            return Err(err);
        }

        let task = Task::new(cmd.cycle_id, details, self.clock.now());
        self.tasks.create(&task).await?;

        info!(
            cycle_id = %cmd.cycle_id,
            task_id = %task.id,
            is_boss_task = task.is_boss_task,
            "task added"
        );
        Ok(task)
    }
}
