//! Progress Calculator - derives boss-unlock state from raw completions.
//!
//! Everything here is pure and recomputed on every read; nothing is cached,
//! so a later rejection lowers the next computed ratio automatically.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TaskId;

use super::rules::{BOSS_UNLOCK_DENOMINATOR, BOSS_UNLOCK_NUMERATOR};
use super::{Task, TaskCompletion};

/// Progress-bar color band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    /// Boss tasks unlocked (80% and up).
    Gold,
    /// 70% and up.
    Green,
    /// 40% and up.
    Yellow,
    Red,
}

/// Snapshot of a cycle's regular-task progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total_needed: u32,
    pub total_completed: u32,
    pub boss_unlocked: bool,
    pub tasks_remaining_for_boss: u32,
}

impl Progress {
    /// Builds progress from raw counts.
    pub fn from_counts(total_needed: u32, total_completed: u32) -> Self {
        let needed_for_boss = needed_for_boss(total_needed);
        Self {
            total_needed,
            total_completed,
            boss_unlocked: total_needed > 0 && total_completed >= needed_for_boss,
            tasks_remaining_for_boss: needed_for_boss.saturating_sub(total_completed),
        }
    }

    /// completed / needed, or 0 when nothing is needed.
    pub fn ratio(&self) -> f64 {
        if self.total_needed == 0 {
            0.0
        } else {
            f64::from(self.total_completed) / f64::from(self.total_needed)
        }
    }

    /// Progress as it was before the most recent counted completion.
    pub fn without_latest(&self) -> Self {
        Self::from_counts(self.total_needed, self.total_completed.saturating_sub(1))
    }

    /// True only on the completion that crossed the unlock threshold.
    pub fn just_unlocked_since(&self, before: &Progress) -> bool {
        !before.boss_unlocked && self.boss_unlocked
    }

    pub fn progress_text(&self) -> String {
        format!(
            "{} of {} tasks done!",
            self.total_completed, self.total_needed
        )
    }

    /// Encouragement shown under the progress bar.
    pub fn encouragement(&self) -> String {
        if self.boss_unlocked {
            return "Amazing! You unlocked the Boss Tasks!".to_string();
        }
        match self.tasks_remaining_for_boss {
            1 => "Complete 1 more task to unlock Boss Tasks!".to_string(),
            n if n <= 3 => format!("Complete {} more tasks to unlock Boss Tasks!", n),
            _ if self.ratio() >= 0.5 => "You're doing great! Keep going!".to_string(),
            _ if self.total_completed > 0 => "Great start! Keep completing tasks!".to_string(),
            _ => "Tap a task to get started!".to_string(),
        }
    }

    pub fn tier(&self) -> ProgressTier {
        let ratio = self.ratio();
        if self.boss_unlocked {
            ProgressTier::Gold
        } else if ratio >= 0.7 {
            ProgressTier::Green
        } else if ratio >= 0.4 {
            ProgressTier::Yellow
        } else {
            ProgressTier::Red
        }
    }

    /// Message used when a boss task is attempted while locked.
    pub fn boss_locked_message(&self) -> String {
        let n = self.tasks_remaining_for_boss;
        format!(
            "Complete {} more task{} to unlock Boss Tasks!",
            n,
            if n == 1 { "" } else { "s" }
        )
    }
}

/// Smallest completed count satisfying completed/needed >= 4/5.
pub fn needed_for_boss(total_needed: u32) -> u32 {
    let scaled = u64::from(total_needed) * u64::from(BOSS_UNLOCK_NUMERATOR);
    let denominator = u64::from(BOSS_UNLOCK_DENOMINATOR);
    // The quotient never exceeds total_needed, so it always fits in u32.
    u32::try_from((scaled + denominator - 1) / denominator).unwrap_or(u32::MAX)
}

/// Computes progress over the regular tasks of a cycle.
///
/// Boss tasks and completions of tasks outside `tasks` are ignored;
/// rejected completions never count.
pub fn calculate_progress<'a, T, C>(tasks: T, completions: C) -> Progress
where
    T: IntoIterator<Item = &'a Task>,
    C: IntoIterator<Item = &'a TaskCompletion>,
{
    let mut total_needed: u32 = 0;
    let mut regular: HashSet<TaskId> = HashSet::new();
    for task in tasks.into_iter().filter(|t| t.is_regular()) {
        total_needed += u32::try_from(task.frequency_per_week).unwrap_or(0);
        regular.insert(task.id);
    }

    let total_completed = completions
        .into_iter()
        .filter(|c| regular.contains(&c.task_id) && c.approval.counts_toward_progress())
        .count();

    Progress::from_counts(total_needed, u32::try_from(total_completed).unwrap_or(u32::MAX))
}

/// Points earned this week: recorded points of every non-rejected completion.
pub fn week_points<'a, C>(completions: C) -> i64
where
    C: IntoIterator<Item = &'a TaskCompletion>,
{
    completions
        .into_iter()
        .filter(|c| c.approval.counts_toward_progress())
        .map(|c| i64::from(c.points_awarded))
        .sum()
}
