//! Cycle overview read model.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::cycle::{calculate_progress, week_points, Progress, Task, TaskCompletion, WeeklyCycle};
use crate::domain::foundation::{CycleId, CycleStatus, DomainError, LocalCalendar, Timestamp};
use crate::ports::{CompletionRepository, TaskRepository};

/// One task with this week's counters.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOverview {
    pub task: Task,
    /// Every completion recorded this week, rejected ones included.
    pub times_completed: u32,
    pub completed_today: bool,
    /// Completions still allowed this week.
    pub remaining_this_week: u32,
}

/// A cycle with its tasks, live progress and week points.
#[derive(Debug, Clone)]
pub struct CycleOverview {
    pub cycle: WeeklyCycle,
    pub tasks: Vec<TaskOverview>,
    pub progress: Progress,
    pub week_points: i64,
    /// Completions still waiting for a tutor decision.
    pub pending_review: u32,
}

impl CycleOverview {
    /// True if any boss task was completed this week.
    pub fn completed_boss_task(&self) -> bool {
        self.tasks
            .iter()
            .any(|t| t.task.is_boss_task && t.times_completed > 0)
    }

    /// Condensed form for dashboards listing several learners.
    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            cycle_id: self.cycle.id(),
            status: self.cycle.status(),
            start_date: self.cycle.start_date(),
            end_date: self.cycle.end_date(),
            progress: self.progress,
            week_points: self.week_points,
            pending_review: self.pending_review,
        }
    }
}

/// One cycle as shown on the tutor dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    pub cycle_id: CycleId,
    pub status: CycleStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: Progress,
    pub week_points: i64,
    pub pending_review: u32,
}

/// Derives the overview from raw records. Nothing here is stored.
pub(crate) fn build_overview(
    cycle: WeeklyCycle,
    tasks: Vec<Task>,
    completions: &[TaskCompletion],
    calendar: &LocalCalendar,
    now: &Timestamp,
) -> CycleOverview {
    let today = calendar.today(now);
    let progress = calculate_progress(&tasks, completions);
    let points = week_points(completions);
    let pending = completions.iter().filter(|c| c.approval.is_pending()).count();

    let tasks = tasks
        .into_iter()
        .map(|task| {
            let mine: Vec<&TaskCompletion> = completions
                .iter()
                .filter(|c| c.task_id == task.id)
                .collect();
            let times_completed = u32::try_from(mine.len()).unwrap_or(u32::MAX);
            let cap = u32::try_from(task.frequency_per_week).unwrap_or(0);
            TaskOverview {
                completed_today: mine.iter().any(|c| today.contains(&c.completed_at)),
                remaining_this_week: cap.saturating_sub(times_completed),
                times_completed,
                task,
            }
        })
        .collect();

    CycleOverview {
        cycle,
        tasks,
        progress,
        week_points: points,
        pending_review: u32::try_from(pending).unwrap_or(u32::MAX),
    }
}

/// Loads a cycle's tasks and completions and builds its overview.
pub(crate) async fn load_overview(
    tasks: &dyn TaskRepository,
    completions: &dyn CompletionRepository,
    cycle: WeeklyCycle,
    calendar: &LocalCalendar,
    now: &Timestamp,
) -> Result<CycleOverview, DomainError> {
    let cycle_tasks = tasks.list_by_cycle(&cycle.id()).await?;
    let cycle_completions = completions.list_by_cycle(&cycle.id()).await?;
    Ok(build_overview(
        cycle,
        cycle_tasks,
        &cycle_completions,
        calendar,
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::{CycleWeek, TaskDetails};
    use crate::domain::foundation::LearnerId;

    fn at(rfc3339: &str) -> Timestamp {
        Timestamp::from_datetime(
            chrono::DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&chrono::Utc),
        )
    }

    fn task(cycle: &WeeklyCycle, frequency: i32, boss: bool) -> Task {
        let details = TaskDetails::new("Task", None, None, None, frequency, boss).unwrap();
        Task::new(cycle.id(), details, at("2024-01-14T10:00:00Z"))
    }

    #[test]
    fn summary_counts_pending_and_boss_completions() {
        let week = CycleWeek::starting(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).unwrap();
        let learner = LearnerId::new();
        let cycle = WeeklyCycle::new(learner, week, at("2024-01-14T10:00:00Z"));
        let regular = task(&cycle, 2, false);
        let boss = task(&cycle, 1, true);

        let mut approved = TaskCompletion::record(&regular, learner, at("2024-01-15T08:00:00Z"));
        approved.review(true).unwrap();
        let pending = TaskCompletion::record(&regular, learner, at("2024-01-16T08:00:00Z"));

        let overview = build_overview(
            cycle.clone(),
            vec![regular.clone(), boss],
            &[approved, pending],
            &LocalCalendar::utc(),
            &at("2024-01-16T12:00:00Z"),
        );

        assert!(!overview.completed_boss_task());
        let summary = overview.summary();
        assert_eq!(summary.cycle_id, cycle.id());
        assert_eq!(summary.status, CycleStatus::Draft);
        assert_eq!(summary.pending_review, 1);
        assert_eq!(summary.week_points, 20);
        assert_eq!(summary.progress.total_completed, 2);
        assert!(summary.progress.boss_unlocked);
    }
}
