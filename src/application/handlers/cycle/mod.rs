//! Cycle command and query handlers.

// Command handlers
mod activate_cycle;
mod create_cycle;
mod finalize_cycle;
mod sweep_expired_cycles;

// Query handlers
mod get_cycle_overview;
mod get_learner_board;
mod list_pending_completions;
mod overview;

pub use activate_cycle::{ActivateCycleCommand, ActivateCycleHandler};
pub use create_cycle::{CreateCycleCommand, CreateCycleHandler};
pub use finalize_cycle::{FinalizeCycleCommand, FinalizeCycleHandler, FinalizeCycleResult};
pub use sweep_expired_cycles::SweepExpiredCyclesHandler;

pub use get_cycle_overview::{GetCycleOverviewHandler, GetCycleOverviewQuery};
pub use get_learner_board::{GetLearnerBoardHandler, LearnerBoard};
pub use list_pending_completions::{
    ListPendingCompletionsHandler, ListPendingCompletionsQuery, PendingCompletion,
};
pub use overview::{CycleOverview, CycleSummary, TaskOverview};
pub(crate) use overview::load_overview;
