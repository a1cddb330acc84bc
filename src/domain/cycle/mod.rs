//! Cycle module - weekly cycle lifecycle, tasks, completions and progress.

mod aggregate;
mod completion;
mod progress;
pub mod rules;
mod task;
mod week;

pub use aggregate::WeeklyCycle;
pub use completion::{ApprovalState, TaskCompletion};
pub use progress::{calculate_progress, needed_for_boss, week_points, Progress, ProgressTier};
pub use task::{point_value_for, Task, TaskDetails};
pub use week::CycleWeek;
