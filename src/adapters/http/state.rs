//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::application::handlers::{
    ActivateCycleHandler, AddTaskHandler, CreateCycleHandler, CreateLearnerHandler,
    DeleteTaskHandler, FinalizeCycleHandler, GetCycleOverviewHandler, GetLearnerBoardHandler,
    ListLearnersHandler, ListPendingCompletionsHandler, RecordCompletionHandler,
    ReviewCompletionHandler, SweepExpiredCyclesHandler,
};
use crate::domain::foundation::LocalCalendar;
use crate::ports::{
    Clock, CompletionRepository, CycleRepository, LearnerRepository, PointsLedger, TaskRepository,
};

/// Dependencies shared by every route; handlers are built per request.
#[derive(Clone)]
pub struct AppState {
    pub learners: Arc<dyn LearnerRepository>,
    pub cycles: Arc<dyn CycleRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub completions: Arc<dyn CompletionRepository>,
    pub ledger: Arc<dyn PointsLedger>,
    pub clock: Arc<dyn Clock>,
    pub calendar: LocalCalendar,
}

impl AppState {
    /// Builds state where one store backs every persistence port.
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>, calendar: LocalCalendar) -> Self
    where
        S: LearnerRepository
            + CycleRepository
            + TaskRepository
            + CompletionRepository
            + PointsLedger
            + 'static,
    {
        Self {
            learners: store.clone(),
            cycles: store.clone(),
            tasks: store.clone(),
            completions: store.clone(),
            ledger: store,
            clock,
            calendar,
        }
    }

    pub fn sweeper(&self) -> Arc<SweepExpiredCyclesHandler> {
        Arc::new(SweepExpiredCyclesHandler::new(
            self.cycles.clone(),
            self.clock.clone(),
            self.calendar,
        ))
    }

    pub fn create_learner_handler(&self) -> CreateLearnerHandler {
        CreateLearnerHandler::new(self.learners.clone(), self.clock.clone())
    }

    pub fn list_learners_handler(&self) -> ListLearnersHandler {
        ListLearnersHandler::new(
            self.learners.clone(),
            self.cycles.clone(),
            self.tasks.clone(),
            self.completions.clone(),
            self.sweeper(),
            self.clock.clone(),
            self.calendar,
        )
    }

    pub fn create_cycle_handler(&self) -> CreateCycleHandler {
        CreateCycleHandler::new(self.cycles.clone(), self.learners.clone(), self.clock.clone())
    }

    pub fn activate_cycle_handler(&self) -> ActivateCycleHandler {
        ActivateCycleHandler::new(
            self.cycles.clone(),
            self.learners.clone(),
            self.tasks.clone(),
            self.clock.clone(),
        )
    }

    pub fn finalize_cycle_handler(&self) -> FinalizeCycleHandler {
        FinalizeCycleHandler::new(
            self.cycles.clone(),
            self.learners.clone(),
            self.ledger.clone(),
            self.clock.clone(),
        )
    }

    pub fn cycle_overview_handler(&self) -> GetCycleOverviewHandler {
        GetCycleOverviewHandler::new(
            self.cycles.clone(),
            self.learners.clone(),
            self.tasks.clone(),
            self.completions.clone(),
            self.clock.clone(),
            self.calendar,
        )
    }

    pub fn learner_board_handler(&self) -> GetLearnerBoardHandler {
        GetLearnerBoardHandler::new(
            self.cycles.clone(),
            self.learners.clone(),
            self.tasks.clone(),
            self.completions.clone(),
            self.sweeper(),
            self.clock.clone(),
            self.calendar,
        )
    }

    pub fn pending_completions_handler(&self) -> ListPendingCompletionsHandler {
        ListPendingCompletionsHandler::new(
            self.cycles.clone(),
            self.learners.clone(),
            self.tasks.clone(),
            self.completions.clone(),
        )
    }

    pub fn add_task_handler(&self) -> AddTaskHandler {
        AddTaskHandler::new(
            self.cycles.clone(),
            self.learners.clone(),
            self.tasks.clone(),
            self.clock.clone(),
        )
    }

    pub fn delete_task_handler(&self) -> DeleteTaskHandler {
        DeleteTaskHandler::new(self.cycles.clone(), self.learners.clone(), self.tasks.clone())
    }

    pub fn record_completion_handler(&self) -> RecordCompletionHandler {
        RecordCompletionHandler::new(
            self.cycles.clone(),
            self.tasks.clone(),
            self.completions.clone(),
            self.clock.clone(),
            self.calendar,
        )
    }

    pub fn review_completion_handler(&self) -> ReviewCompletionHandler {
        ReviewCompletionHandler::new(
            self.cycles.clone(),
            self.learners.clone(),
            self.completions.clone(),
            self.ledger.clone(),
        )
    }
}
