//! Foundation module - Shared domain primitives.
//!
//! Identifiers, time, the local calendar, the error taxonomy and the
//! authorization vocabulary shared by the learner and cycle modules.

mod calendar;
mod command;
mod cycle_status;
mod errors;
mod ids;
mod ownership;
mod principal;
mod state_machine;
mod timestamp;

pub use calendar::{DayBounds, LocalCalendar, MAX_UTC_OFFSET_MINUTES};
pub use command::CommandMetadata;
pub use cycle_status::CycleStatus;
pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError};
pub use ids::{CompletionId, CycleId, LearnerId, TaskId, TutorId};
pub use ownership::{OwnedByLearner, OwnedByTutor};
pub use principal::{Principal, Role};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
