//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `LearnerRepository` - Learner profiles
//! - `CycleRepository` - Weekly cycles and the single-active invariant
//! - `TaskRepository` - Tasks with cap and lock re-checks
//! - `CompletionRepository` - Append-only completion records
//! - `PointsLedger` - Approval decisions and lifetime point credit
//!
//! ## Time
//!
//! - `Clock` - Current instant

mod clock;
mod completion_repository;
mod cycle_repository;
mod learner_repository;
mod points_ledger;
mod task_repository;

pub use clock::Clock;
pub use completion_repository::{CompletionGuard, CompletionRepository};
pub use cycle_repository::CycleRepository;
pub use learner_repository::LearnerRepository;
pub use points_ledger::{CycleSettlement, PointsLedger};
pub use task_repository::TaskRepository;
