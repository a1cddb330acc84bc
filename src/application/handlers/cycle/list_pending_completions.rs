//! ListPendingCompletionsHandler - the tutor's review queue for a cycle.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::application::handlers::access::cycle_for_tutor;
use crate::domain::cycle::TaskCompletion;
use crate::domain::foundation::{CommandMetadata, CycleId, DomainError};
use crate::ports::{CompletionRepository, CycleRepository, LearnerRepository, TaskRepository};

#[derive(Debug, Clone)]
pub struct ListPendingCompletionsQuery {
    pub cycle_id: CycleId,
}

/// A completion awaiting review, with its task title for display.
#[derive(Debug, Clone, Serialize)]
pub struct PendingCompletion {
    pub completion: TaskCompletion,
    pub task_title: String,
    pub is_boss_task: bool,
}

pub struct ListPendingCompletionsHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    tasks: Arc<dyn TaskRepository>,
    completions: Arc<dyn CompletionRepository>,
}

impl ListPendingCompletionsHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        tasks: Arc<dyn TaskRepository>,
        completions: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            cycles,
            learners,
            tasks,
            completions,
        }
    }

    /// Pending completions, oldest first.
    pub async fn handle(
        &self,
        query: ListPendingCompletionsQuery,
        metadata: CommandMetadata,
    ) -> Result<Vec<PendingCompletion>, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        cycle_for_tutor(
            self.cycles.as_ref(),
            self.learners.as_ref(),
            &tutor_id,
            &query.cycle_id,
        )
        .await?;

        let tasks: HashMap<_, _> = self
            .tasks
            .list_by_cycle(&query.cycle_id)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let pending = self
            .completions
            .list_pending_by_cycle(&query.cycle_id)
            .await?
            .into_iter()
            .map(|completion| {
                let task = tasks.get(&completion.task_id);
                PendingCompletion {
                    task_title: task.map(|t| t.title.clone()).unwrap_or_default(),
                    is_boss_task: task.map(|t| t.is_boss_task).unwrap_or(false),
                    completion,
                }
            })
            .collect();
        Ok(pending)
    }
}
