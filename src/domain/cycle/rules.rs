//! Fixed game rules for weekly cycles.
//!
//! None of these are configurable; changing one changes the game for every
//! learner and would invalidate historic progress.

/// Maximum number of tasks (regular and boss) in one cycle.
pub const MAX_WEEKLY_TASKS: usize = 12;

/// Maximum number of boss tasks in one cycle.
pub const MAX_BOSS_TASKS: usize = 2;

/// Points recorded on a regular task completion.
pub const REGULAR_TASK_POINTS: i32 = 10;

/// Boss tasks reward something other than points.
pub const BOSS_TASK_POINTS: i32 = 0;

/// Allowed range for `frequency_per_week`.
pub const MIN_FREQUENCY_PER_WEEK: i32 = 1;
pub const MAX_FREQUENCY_PER_WEEK: i32 = 14;

/// Boss tasks unlock once completed/needed reaches 4/5 (80%).
///
/// Kept as a fraction so the comparison is exact in integer arithmetic.
pub const BOSS_UNLOCK_NUMERATOR: u32 = 4;
pub const BOSS_UNLOCK_DENOMINATOR: u32 = 5;

pub const MAX_TASK_TITLE_LENGTH: usize = 50;
pub const MAX_TASK_TEXT_LENGTH: usize = 200;
pub const MAX_ICON_LENGTH: usize = 50;
