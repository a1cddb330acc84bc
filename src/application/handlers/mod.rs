//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations through
//! the ports. Every handler takes the acting principal via
//! `CommandMetadata` and returns `DomainError` on failure.

mod access;
pub mod completion;
pub mod cycle;
pub mod learner;
pub mod task;

pub use completion::{
    RecordCompletionCommand, RecordCompletionHandler, RecordCompletionResult,
    ReviewCompletionCommand, ReviewCompletionHandler, ReviewCompletionResult,
};
pub use cycle::{
    ActivateCycleCommand, ActivateCycleHandler, CreateCycleCommand, CreateCycleHandler,
    CycleOverview, CycleSummary, FinalizeCycleCommand, FinalizeCycleHandler, FinalizeCycleResult,
    GetCycleOverviewHandler, GetCycleOverviewQuery, GetLearnerBoardHandler, LearnerBoard,
    ListPendingCompletionsHandler, ListPendingCompletionsQuery, PendingCompletion,
    SweepExpiredCyclesHandler, TaskOverview,
};
pub use learner::{CreateLearnerCommand, CreateLearnerHandler, LearnerSummary, ListLearnersHandler};
pub use task::{AddTaskCommand, AddTaskHandler, DeleteTaskCommand, DeleteTaskHandler};
