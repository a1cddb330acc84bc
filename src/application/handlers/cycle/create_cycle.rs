//! CreateCycleHandler - Command handler for drafting a learner's week.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::application::handlers::access::owned_learner;
use crate::domain::cycle::{CycleWeek, WeeklyCycle};
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, LearnerId};
use crate::ports::{Clock, CycleRepository, LearnerRepository};

/// Command to create a weekly cycle.
#[derive(Debug, Clone)]
pub struct CreateCycleCommand {
    pub learner_id: LearnerId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Handler for creating cycles.
pub struct CreateCycleHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateCycleHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            learners,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<WeeklyCycle, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        // Date shape is validated before touching storage.
        let week = CycleWeek::new(cmd.start_date, cmd.end_date)?;

        owned_learner(self.learners.as_ref(), &tutor_id, &cmd.learner_id).await?;

        if let Some(active) = self.cycles.find_active_for_learner(&cmd.learner_id).await? {
            debug!(learner_id = %cmd.learner_id, active_cycle_id = %active.id(), "active cycle blocks creation");
            return Err(DomainError::new(
                ErrorCode::ActiveCycleExists,
                "This learner already has an active cycle",
            )
            .with_detail("cycle_id", active.id().to_string()));
        }

        let cycle = WeeklyCycle::new(cmd.learner_id, week, self.clock.now());
        self.cycles.create(&cycle).await?;

        info!(
            cycle_id = %cycle.id(),
            learner_id = %cmd.learner_id,
            start_date = %cycle.start_date(),
            correlation_id = %metadata.correlation_id(),
            "weekly cycle created"
        );
        Ok(cycle)
    }
}
