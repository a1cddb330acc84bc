//! Learner module - child profiles owned by a tutor.

mod aggregate;
mod values;

pub use aggregate::{Learner, MAX_LEARNERS_PER_TUTOR};
pub use values::{DisplayName, Pin};
