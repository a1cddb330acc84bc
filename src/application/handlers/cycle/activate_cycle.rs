//! ActivateCycleHandler - Command handler for starting a learner's week.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::handlers::access::cycle_for_tutor;
use crate::domain::cycle::WeeklyCycle;
use crate::domain::foundation::{CommandMetadata, CycleId, DomainError, ErrorCode};
use crate::ports::{Clock, CycleRepository, LearnerRepository, TaskRepository};

/// Command to activate a draft cycle.
#[derive(Debug, Clone)]
pub struct ActivateCycleCommand {
    pub cycle_id: CycleId,
}

/// Handler for activating cycles.
///
/// The checks here give precise errors; the storage update is what
/// actually guarantees a single ACTIVE cycle per learner under races.
pub struct ActivateCycleHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    tasks: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
}

impl ActivateCycleHandler {
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
        cmd: ActivateCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<WeeklyCycle, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        let mut cycle = cycle_for_tutor(
            self.cycles.as_ref(),
            self.learners.as_ref(),
            &tutor_id,
            &cmd.cycle_id,
        )
        .await?;

        let now = self.clock.now();
        let task_count = self.tasks.list_by_cycle(&cmd.cycle_id).await?.len();
        if let Err(err) = cycle.activate(task_count, now) {
            debug!(cycle_id = %cmd.cycle_id, code = %err.code, "activation rejected");
            return Err(err);
        }

        if let Some(active) = self.cycles.find_active_for_learner(&cycle.learner_id()).await? {
            return Err(DomainError::new(
                ErrorCode::ActiveCycleExists,
                "This learner already has an active cycle",
            )
            .with_detail("cycle_id", active.id().to_string()));
        }

        let activated = self.cycles.activate(&cmd.cycle_id, now).await?;

        info!(
            cycle_id = %cmd.cycle_id,
            learner_id = %activated.learner_id(),
            task_count,
            correlation_id = %metadata.correlation_id(),
            "weekly cycle activated"
        );
        Ok(activated)
    }
}
