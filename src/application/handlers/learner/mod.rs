//! Learner command and query handlers.

mod create_learner;
mod list_learners;

pub use create_learner::{CreateLearnerCommand, CreateLearnerHandler};
pub use list_learners::{LearnerSummary, ListLearnersHandler};
