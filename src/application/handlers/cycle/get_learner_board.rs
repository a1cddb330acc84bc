//! GetLearnerBoardHandler - the learner's home screen.

use std::sync::Arc;

use crate::application::handlers::access::load_learner;
use crate::domain::cycle::WeeklyCycle;
use crate::domain::foundation::{CommandMetadata, CycleStatus, DomainError, LocalCalendar};
use crate::domain::learner::Learner;
use crate::ports::{Clock, CompletionRepository, CycleRepository, LearnerRepository, TaskRepository};

use super::overview::{load_overview, CycleOverview};
use super::SweepExpiredCyclesHandler;

/// The learner's profile, the week being played and the last finished week.
///
/// `review_cycle` is a week whose end date has passed but which the tutor
/// has not settled yet; the learner sees how it went while waiting.
#[derive(Debug, Clone)]
pub struct LearnerBoard {
    pub learner: Learner,
    pub active_cycle: Option<CycleOverview>,
    pub review_cycle: Option<CycleOverview>,
}

pub struct GetLearnerBoardHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    tasks: Arc<dyn TaskRepository>,
    completions: Arc<dyn CompletionRepository>,
    sweeper: Arc<SweepExpiredCyclesHandler>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
}

impl GetLearnerBoardHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        tasks: Arc<dyn TaskRepository>,
        completions: Arc<dyn CompletionRepository>,
        sweeper: Arc<SweepExpiredCyclesHandler>,
        clock: Arc<dyn Clock>,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            cycles,
            learners,
            tasks,
            completions,
            sweeper,
            clock,
            calendar,
        }
    }

    pub async fn handle(&self, metadata: CommandMetadata) -> Result<LearnerBoard, DomainError> {
        let learner_id = metadata.principal.require_learner()?;
        let learner = load_learner(self.learners.as_ref(), &learner_id).await?;

        self.sweeper.sweep().await?;

        let active = self.cycles.find_active_for_learner(&learner_id).await?;
        let review = self
            .cycles
            .find_latest_for_learner(&learner_id, &[CycleStatus::Review])
            .await?;

        let active_cycle = self.overview_of(active).await?;
        let review_cycle = self.overview_of(review).await?;

        Ok(LearnerBoard {
            learner,
            active_cycle,
            review_cycle,
        })
    }

    async fn overview_of(
        &self,
        cycle: Option<WeeklyCycle>,
    ) -> Result<Option<CycleOverview>, DomainError> {
        match cycle {
            Some(cycle) => Ok(Some(
                load_overview(
                    self.tasks.as_ref(),
                    self.completions.as_ref(),
                    cycle,
                    &self.calendar,
                    &self.clock.now(),
                )
                .await?,
            )),
            None => Ok(None),
        }
    }
}
