//! Completion command handlers.

mod record_completion;
mod review_completion;

pub use record_completion::{
    RecordCompletionCommand, RecordCompletionHandler, RecordCompletionResult,
};
pub use review_completion::{
    ReviewCompletionCommand, ReviewCompletionHandler, ReviewCompletionResult,
};
