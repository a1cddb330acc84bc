//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, time, calendar, errors, principal)
//! - `learner` - Learner profiles and their lifetime points
//! - `cycle` - Weekly cycle lifecycle, tasks, completions and progress

pub mod cycle;
pub mod foundation;
pub mod learner;
