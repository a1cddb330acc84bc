//! RecordCompletionHandler - a learner ticks off a task.
//!
//! Preconditions are checked in a fixed order so every rejection has one
//! well-defined reason:
//!
//! 1. task exists and belongs to the learner's cycle
//! 2. the cycle is ACTIVE
//! 3. the cycle's last local day has not passed
//! 4. the weekly frequency cap is not reached
//! 5. the task was not already completed today
//! 6. boss tasks require the unlock threshold
//!
//! Storage re-checks 2, 4 and 5 inside the insert transaction.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::cycle::{calculate_progress, week_points, Progress, TaskCompletion};
use crate::domain::foundation::{
    CommandMetadata, CycleId, DomainError, ErrorCode, LocalCalendar, OwnedByLearner, TaskId,
};
use crate::ports::{Clock, CompletionGuard, CompletionRepository, CycleRepository, TaskRepository};

/// Command to record a completion.
#[derive(Debug, Clone)]
pub struct RecordCompletionCommand {
    pub task_id: TaskId,
}

/// The new completion together with refreshed progress.
#[derive(Debug, Clone, Serialize)]
pub struct RecordCompletionResult {
    pub completion: TaskCompletion,
    pub progress: Progress,
    /// True only for the completion that crossed the boss threshold.
    pub just_unlocked_boss: bool,
    pub week_points: i64,
}

pub struct RecordCompletionHandler {
    cycles: Arc<dyn CycleRepository>,
    tasks: Arc<dyn TaskRepository>,
    completions: Arc<dyn CompletionRepository>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
}

impl RecordCompletionHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        tasks: Arc<dyn TaskRepository>,
        completions: Arc<dyn CompletionRepository>,
        clock: Arc<dyn Clock>,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            cycles,
            tasks,
            completions,
            clock,
            calendar,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordCompletionCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordCompletionResult, DomainError> {
        let learner_id = metadata.principal.require_learner()?;
        let now = self.clock.now();

        // 1. ownership
        let task = self.tasks.find_by_id(&cmd.task_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::TaskNotFound, "Task not found")
                .with_detail("task_id", cmd.task_id.to_string())
        })?;
        let cycle = self.cycles.find_by_id(&task.cycle_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::CycleNotFound, "Weekly cycle not found")
                .with_detail("cycle_id", task.cycle_id.to_string())
        })?;
        cycle.check_learner(&learner_id)?;

        // 2-3. cycle is playable
        cycle.ensure_playable(&self.calendar, &now)?;

        // 4. weekly cap; rejected completions still use up a slot
        let mine = self.completions.list_for_task(&task.id, &learner_id).await?;
        let cap = usize::try_from(task.frequency_per_week).unwrap_or(0);
        if mine.len() >= cap {
            debug!(task_id = %task.id, learner_id = %learner_id, "frequency cap reached");
            return Err(DomainError::new(
                ErrorCode::FrequencyExceeded,
                format!(
                    "You've already completed this task the maximum times this week ({})",
                    task.frequency_per_week
                ),
            )
            .with_detail("frequency_per_week", task.frequency_per_week.to_string()));
        }

        // 5. once per local day
        let today = self.calendar.today(&now);
        if mine.iter().any(|c| today.contains(&c.completed_at)) {
            debug!(task_id = %task.id, learner_id = %learner_id, "already completed today");
            return Err(DomainError::new(
                ErrorCode::AlreadyCompletedToday,
                "You already completed this task today. Come back tomorrow!",
            ));
        }

        // 6. boss gate
        if task.is_boss_task {
            let progress = self.current_progress(&task.cycle_id).await?;
            if !progress.boss_unlocked {
                debug!(
                    task_id = %task.id,
                    tasks_remaining = progress.tasks_remaining_for_boss,
                    "boss task still locked"
                );
                return Err(
                    DomainError::new(ErrorCode::BossLocked, progress.boss_locked_message())
                        .with_detail(
                            "tasks_remaining",
                            progress.tasks_remaining_for_boss.to_string(),
                        )
                        .with_detail("is_locked", "true"),
                );
            }
        }

        let completion = TaskCompletion::record(&task, learner_id, now);
        self.completions
            .insert_guarded(
                &completion,
                CompletionGuard {
                    frequency_per_week: task.frequency_per_week,
                    today,
                },
            )
            .await?;

        let all = self.completions.list_by_cycle(&task.cycle_id).await?;
        let tasks = self.tasks.list_by_cycle(&task.cycle_id).await?;
        let progress = calculate_progress(&tasks, &all);
        // Boss completions do not move the ratio, so they can never cross it.
        let before = if task.is_regular() {
            progress.without_latest()
        } else {
            progress
        };
        let just_unlocked_boss = progress.just_unlocked_since(&before);

        info!(
            completion_id = %completion.id,
            task_id = %task.id,
            learner_id = %learner_id,
            completed = progress.total_completed,
            needed = progress.total_needed,
            just_unlocked_boss,
            "completion recorded"
        );

        Ok(RecordCompletionResult {
            completion,
            progress,
            just_unlocked_boss,
            week_points: week_points(&all),
        })
    }

    async fn current_progress(
        &self,
        cycle_id: &CycleId,
    ) -> Result<Progress, DomainError> {
        let tasks = self.tasks.list_by_cycle(cycle_id).await?;
        let completions = self.completions.list_by_cycle(cycle_id).await?;
        Ok(calculate_progress(&tasks, &completions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::cycle::{CycleWeek, Task, TaskDetails, WeeklyCycle};
    use crate::domain::foundation::{CycleStatus, LearnerId, Principal, TutorId};
    use crate::domain::learner::{DisplayName, Learner, Pin};
    use chrono::NaiveDate;

    struct Fixture {
        handler: RecordCompletionHandler,
        store: Arc<InMemoryStore>,
        clock: Arc<ManualClock>,
        learner: LearnerId,
        cycle: WeeklyCycle,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        // Monday morning of the cycle week
        let clock = Arc::new(ManualClock::at_rfc3339("2024-01-15T08:00:00Z").unwrap());
        let learner = Learner::new(
            TutorId::new(),
            DisplayName::new("Ava").unwrap(),
            Pin::new("1234").unwrap(),
            clock.now(),
        );
        store.seed_learner(learner.clone());
        let week = CycleWeek::starting(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).unwrap();
        let cycle = WeeklyCycle::new(learner.id, week, clock.now());
        store.seed_cycle(cycle.clone());
        store.force_status(&cycle.id(), CycleStatus::Active);
        Fixture {
            handler: RecordCompletionHandler::new(
                store.clone(),
                store.clone(),
                store.clone(),
                clock.clone(),
                LocalCalendar::utc(),
            ),
            store,
            clock,
            learner: learner.id,
            cycle,
        }
    }

    fn add_task(f: &Fixture, frequency: i32, boss: bool) -> Task {
        let details = TaskDetails::new("Task", None, None, None, frequency, boss).unwrap();
        let task = Task::new(f.cycle.id(), details, f.clock.now());
        f.store.seed_task(task.clone());
        task
    }

    async fn complete(f: &Fixture, task: &Task) -> Result<RecordCompletionResult, DomainError> {
        f.handler
            .handle(
                RecordCompletionCommand { task_id: task.id },
                CommandMetadata::new(Principal::learner(f.learner)),
            )
            .await
    }

    #[tokio::test]
    async fn first_completion_is_pending_with_points() {
        let f = fixture();
        let task = add_task(&f, 3, false);
        let result = complete(&f, &task).await.unwrap();
        assert!(result.completion.approval.is_pending());
        assert_eq!(result.completion.points_awarded, 10);
        assert_eq!(result.progress.progress_text(), "1 of 3 tasks done!");
        assert_eq!(result.week_points, 10);
    }

    #[tokio::test]
    async fn same_day_second_attempt_is_blocked() {
        let f = fixture();
        let task = add_task(&f, 5, false);
        complete(&f, &task).await.unwrap();
        f.clock.advance_minutes(60);
        let err = complete(&f, &task).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyCompletedToday);
    }

    #[tokio::test]
    async fn other_learner_is_forbidden() {
        let f = fixture();
        let task = add_task(&f, 3, false);
        let err = f
            .handler
            .handle(
                RecordCompletionCommand { task_id: task.id },
                CommandMetadata::new(Principal::learner(LearnerId::new())),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn draft_cycle_reports_no_active_cycle() {
        let f = fixture();
        let task = add_task(&f, 3, false);
        f.store.force_status(&f.cycle.id(), CycleStatus::Draft);
        let err = complete(&f, &task).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoActiveCycle);
    }

    #[tokio::test]
    async fn after_sunday_reports_cycle_ended() {
        let f = fixture();
        let task = add_task(&f, 3, false);
        f.clock.set_rfc3339("2024-01-22T00:00:00Z").unwrap();
        let err = complete(&f, &task).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleEnded);
    }

    #[tokio::test]
    async fn locked_boss_task_reports_remaining() {
        let f = fixture();
        add_task(&f, 5, false);
        let boss = add_task(&f, 1, true);
        let err = complete(&f, &boss).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BossLocked);
        assert_eq!(err.detail("tasks_remaining"), Some("4"));
        assert_eq!(err.detail("is_locked"), Some("true"));
        assert_eq!(err.message, "Complete 4 more tasks to unlock Boss Tasks!");
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let f = fixture();
        let err = f
            .handler
            .handle(
                RecordCompletionCommand { task_id: TaskId::new() },
                CommandMetadata::new(Principal::learner(f.learner)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
    }
}
