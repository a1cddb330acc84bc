//! GetCycleOverviewHandler - Query handler for one cycle's board.

use std::sync::Arc;

use crate::application::handlers::access::cycle_for_principal;
use crate::domain::foundation::{CommandMetadata, CycleId, DomainError, LocalCalendar};
use crate::ports::{Clock, CompletionRepository, CycleRepository, LearnerRepository, TaskRepository};

use super::overview::{load_overview, CycleOverview};

/// Query for a cycle overview.
#[derive(Debug, Clone)]
pub struct GetCycleOverviewQuery {
    pub cycle_id: CycleId,
}

/// Visible to the owning learner and that learner's tutor.
pub struct GetCycleOverviewHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    tasks: Arc<dyn TaskRepository>,
    completions: Arc<dyn CompletionRepository>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
}

impl GetCycleOverviewHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        tasks: Arc<dyn TaskRepository>,
        completions: Arc<dyn CompletionRepository>,
        clock: Arc<dyn Clock>,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            cycles,
            learners,
            tasks,
            completions,
            clock,
            calendar,
        }
    }

    pub async fn handle(
        &self,
        query: GetCycleOverviewQuery,
        metadata: CommandMetadata,
    ) -> Result<CycleOverview, DomainError> {
        let cycle = cycle_for_principal(
            self.cycles.as_ref(),
            self.learners.as_ref(),
            &metadata.principal,
            &query.cycle_id,
        )
        .await?;

        load_overview(
            self.tasks.as_ref(),
            self.completions.as_ref(),
            cycle,
            &self.calendar,
            &self.clock.now(),
        )
        .await
    }
}
