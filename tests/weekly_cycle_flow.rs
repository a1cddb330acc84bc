//! Integration tests for the weekly cycle lifecycle.
//!
//! These drive the application handlers end to end against the in-memory
//! store and a manual clock:
//! 1. Completion rules (weekly cap, same day, boss gate)
//! 2. Settlement (auto-approval, rejection, lifetime points)
//! 3. Expiry sweep and the single-active invariant

use std::sync::Arc;

use chrono::NaiveDate;

use board_master::adapters::http::AppState;
use board_master::adapters::{InMemoryStore, ManualClock};
use board_master::application::handlers::{
    ActivateCycleCommand, AddTaskCommand, CreateCycleCommand, CreateLearnerCommand,
    FinalizeCycleCommand, GetCycleOverviewQuery, ListPendingCompletionsQuery,
    RecordCompletionCommand, RecordCompletionResult, ReviewCompletionCommand,
};
use board_master::domain::cycle::{Task, WeeklyCycle};
use board_master::domain::foundation::{
    CommandMetadata, CycleStatus, DomainError, ErrorCode, LocalCalendar, Principal, TutorId,
};
use board_master::domain::learner::{DisplayName, Learner, Pin};
use board_master::ports::Clock;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct World {
    state: AppState,
    store: Arc<InMemoryStore>,
    clock: Arc<ManualClock>,
    tutor: TutorId,
    learner: Learner,
}

impl World {
    /// Monday 2024-01-15, 08:00 UTC.
    async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::at_rfc3339("2024-01-15T08:00:00Z").unwrap());
        let state = AppState::from_store(store.clone(), clock.clone(), LocalCalendar::utc());
        let tutor = TutorId::new();

        let learner = state
            .create_learner_handler()
            .handle(
                CreateLearnerCommand {
                    display_name: "Ava".to_string(),
                    pin: "1234".to_string(),
                },
                CommandMetadata::new(Principal::tutor(tutor)),
            )
            .await
            .unwrap();

        Self {
            state,
            store,
            clock,
            tutor,
            learner,
        }
    }

    /// A world whose learner already earned points in earlier weeks.
    async fn with_banked_points(points: i64) -> Self {
        let world = Self::new().await;
        let mut learner = Learner::new(
            world.tutor,
            DisplayName::new("Ben").unwrap(),
            Pin::new("5678").unwrap(),
            world.clock.now(),
        );
        learner.total_points = points;
        world.store.seed_learner(learner.clone());
        Self { learner, ..world }
    }

    fn as_tutor(&self) -> CommandMetadata {
        CommandMetadata::new(Principal::tutor(self.tutor))
    }

    fn as_learner(&self) -> CommandMetadata {
        CommandMetadata::new(Principal::learner(self.learner.id))
    }

    async fn draft_cycle(&self, monday: (i32, u32, u32)) -> WeeklyCycle {
        let start = NaiveDate::from_ymd_opt(monday.0, monday.1, monday.2).unwrap();
        self.state
            .create_cycle_handler()
            .handle(
                CreateCycleCommand {
                    learner_id: self.learner.id,
                    start_date: start,
                    end_date: start + chrono::Duration::days(6),
                },
                self.as_tutor(),
            )
            .await
            .unwrap()
    }

    async fn add_task(&self, cycle: &WeeklyCycle, title: &str, freq: i32, boss: bool) -> Task {
        self.state
            .add_task_handler()
            .handle(
                AddTaskCommand {
                    cycle_id: cycle.id(),
                    title: title.to_string(),
                    description: None,
                    icon: None,
                    expectation: None,
                    frequency_per_week: freq,
                    is_boss_task: boss,
                },
                self.as_tutor(),
            )
            .await
            .unwrap()
    }

    async fn activate(&self, cycle: &WeeklyCycle) -> Result<WeeklyCycle, DomainError> {
        self.state
            .activate_cycle_handler()
            .handle(
                ActivateCycleCommand {
                    cycle_id: cycle.id(),
                },
                self.as_tutor(),
            )
            .await
    }

    async fn complete(&self, task: &Task) -> Result<RecordCompletionResult, DomainError> {
        self.state
            .record_completion_handler()
            .handle(RecordCompletionCommand { task_id: task.id }, self.as_learner())
            .await
    }

    fn next_day(&self) {
        self.clock.advance_days(1);
    }
}

// =============================================================================
// Completion rules
// =============================================================================

#[tokio::test]
async fn weekly_cap_blocks_the_fourth_completion() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let reading = w.add_task(&cycle, "Read 20 minutes", 3, false).await;
    w.activate(&cycle).await.unwrap();

    for _ in 0..3 {
        w.complete(&reading).await.unwrap();
        w.next_day();
    }

    let err = w.complete(&reading).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::FrequencyExceeded);
}

#[tokio::test]
async fn second_completion_on_the_same_day_is_blocked() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let dishes = w.add_task(&cycle, "Dishes", 5, false).await;
    w.activate(&cycle).await.unwrap();

    w.complete(&dishes).await.unwrap();
    w.clock.advance_minutes(8 * 60);
    let err = w.complete(&dishes).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyCompletedToday);

    // Local midnight resets the rule.
    w.clock.set_rfc3339("2024-01-16T00:00:00Z").unwrap();
    assert!(w.complete(&dishes).await.is_ok());
}

#[tokio::test]
async fn boss_task_unlocks_at_eighty_percent_and_fires_once() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let a = w.add_task(&cycle, "Homework", 5, false).await;
    let b = w.add_task(&cycle, "Piano", 5, false).await;
    let boss = w.add_task(&cycle, "Clean the garage", 1, true).await;
    w.activate(&cycle).await.unwrap();

    // Seven of ten regular completions over four days.
    for _ in 0..3 {
        assert!(!w.complete(&a).await.unwrap().just_unlocked_boss);
        assert!(!w.complete(&b).await.unwrap().just_unlocked_boss);
        w.next_day();
    }
    assert!(!w.complete(&a).await.unwrap().just_unlocked_boss);

    let err = w.complete(&boss).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BossLocked);
    assert_eq!(err.detail("tasks_remaining"), Some("1"));
    assert_eq!(err.detail("is_locked"), Some("true"));
    assert_eq!(err.message, "Complete 1 more task to unlock Boss Tasks!");

    // The eighth crosses the threshold.
    let eighth = w.complete(&b).await.unwrap();
    assert!(eighth.just_unlocked_boss);
    assert!(eighth.progress.boss_unlocked);
    assert_eq!(eighth.progress.tasks_remaining_for_boss, 0);

    w.next_day();
    let ninth = w.complete(&a).await.unwrap();
    assert!(!ninth.just_unlocked_boss);

    let boss_done = w.complete(&boss).await.unwrap();
    assert!(!boss_done.just_unlocked_boss);
    assert_eq!(boss_done.completion.points_awarded, 0);
    // Boss completions never count toward progress.
    assert_eq!(boss_done.progress.total_completed, 9);

    let tenth = w.complete(&b).await.unwrap();
    assert!(!tenth.just_unlocked_boss);
    assert_eq!(tenth.week_points, 100);
}

#[tokio::test]
async fn rejection_can_relock_the_boss_task() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let a = w.add_task(&cycle, "Homework", 5, false).await;
    let boss = w.add_task(&cycle, "Bake bread", 1, true).await;
    w.activate(&cycle).await.unwrap();

    let mut completions = Vec::new();
    for _ in 0..4 {
        completions.push(w.complete(&a).await.unwrap().completion);
        w.next_day();
    }

    // 4 of 5 is exactly 80%; rejecting one drops it to 3 of 5.
    w.state
        .review_completion_handler()
        .handle(
            ReviewCompletionCommand {
                completion_id: completions[0].id,
                approved: false,
            },
            w.as_tutor(),
        )
        .await
        .unwrap();

    let err = w.complete(&boss).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BossLocked);
    assert_eq!(err.detail("tasks_remaining"), Some("1"));
}

#[tokio::test]
async fn completions_stop_when_the_week_ends() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let a = w.add_task(&cycle, "Homework", 7, false).await;
    w.activate(&cycle).await.unwrap();

    w.clock.set_rfc3339("2024-01-21T23:59:00Z").unwrap();
    assert!(w.complete(&a).await.is_ok());

    w.clock.set_rfc3339("2024-01-22T00:00:00Z").unwrap();
    let err = w.complete(&a).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CycleEnded);
}

// =============================================================================
// Settlement
// =============================================================================

#[tokio::test]
async fn finalize_auto_approves_pending_and_skips_rejected() {
    let w = World::with_banked_points(50).await;

    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let a = w.add_task(&cycle, "Homework", 5, false).await;
    let b = w.add_task(&cycle, "Piano", 5, false).await;
    w.activate(&cycle).await.unwrap();

    w.complete(&a).await.unwrap();
    w.complete(&b).await.unwrap();
    w.next_day();
    let rejected = w.complete(&a).await.unwrap().completion;

    w.state
        .review_completion_handler()
        .handle(
            ReviewCompletionCommand {
                completion_id: rejected.id,
                approved: false,
            },
            w.as_tutor(),
        )
        .await
        .unwrap();

    let pending = w
        .state
        .pending_completions_handler()
        .handle(
            ListPendingCompletionsQuery {
                cycle_id: cycle.id(),
            },
            w.as_tutor(),
        )
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);

    let result = w
        .state
        .finalize_cycle_handler()
        .handle(
            FinalizeCycleCommand {
                cycle_id: cycle.id(),
            },
            w.as_tutor(),
        )
        .await
        .unwrap();

    assert_eq!(result.auto_approved, 2);
    assert_eq!(result.points_awarded, 20);
    assert_eq!(w.store.learner(&w.learner.id).unwrap().total_points, 70);

    let settled = w.store.cycle(&cycle.id()).unwrap();
    assert_eq!(settled.status(), CycleStatus::Completed);
    assert!(settled.tutor_reviewed_at().is_some());

    let again = w
        .state
        .finalize_cycle_handler()
        .handle(
            FinalizeCycleCommand {
                cycle_id: cycle.id(),
            },
            w.as_tutor(),
        )
        .await
        .unwrap_err();
    assert_eq!(again.code, ErrorCode::InvalidStateTransition);
}

#[tokio::test]
async fn approval_credits_immediately_and_only_once() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let a = w.add_task(&cycle, "Homework", 5, false).await;
    w.activate(&cycle).await.unwrap();
    let completion = w.complete(&a).await.unwrap().completion;

    let handler = w.state.review_completion_handler();
    let review = || {
        handler.handle(
            ReviewCompletionCommand {
                completion_id: completion.id,
                approved: true,
            },
            w.as_tutor(),
        )
    };

    let first = review().await.unwrap();
    assert_eq!(first.points_credited, 10);
    assert_eq!(w.store.learner(&w.learner.id).unwrap().total_points, 10);

    let err = review().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyReviewed);
    assert_eq!(w.store.learner(&w.learner.id).unwrap().total_points, 10);
}

// =============================================================================
// Expiry sweep and single-active invariant
// =============================================================================

#[tokio::test]
async fn board_read_sweeps_ended_cycle_into_review() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    w.add_task(&cycle, "Homework", 5, false).await;
    w.activate(&cycle).await.unwrap();

    let board = w
        .state
        .learner_board_handler()
        .handle(w.as_learner())
        .await
        .unwrap();
    assert!(board.active_cycle.is_some());

    w.clock.set_rfc3339("2024-01-22T06:00:00Z").unwrap();
    let board = w
        .state
        .learner_board_handler()
        .handle(w.as_learner())
        .await
        .unwrap();
    assert!(board.active_cycle.is_none());
    assert_eq!(
        w.store.cycle(&cycle.id()).unwrap().status(),
        CycleStatus::Review
    );
    let review = board.review_cycle.unwrap();
    assert_eq!(review.cycle.id(), cycle.id());
    assert_eq!(review.cycle.status(), CycleStatus::Review);

    // Running it again changes nothing.
    assert_eq!(w.state.sweeper().sweep().await.unwrap(), 0);
    assert_eq!(
        w.store.cycle(&cycle.id()).unwrap().status(),
        CycleStatus::Review
    );
}

#[tokio::test]
async fn board_shows_last_week_results_while_it_waits_for_review() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let homework = w.add_task(&cycle, "Homework", 5, false).await;
    let boss = w.add_task(&cycle, "Build a fort", 1, true).await;
    w.activate(&cycle).await.unwrap();

    // Four of five on Monday to Thursday, then the boss on Thursday.
    for day in 0..4 {
        if day > 0 {
            w.next_day();
        }
        w.complete(&homework).await.unwrap();
    }
    w.complete(&boss).await.unwrap();

    let board = w
        .state
        .learner_board_handler()
        .handle(w.as_learner())
        .await
        .unwrap();
    assert!(board.review_cycle.is_none());

    w.clock.set_rfc3339("2024-01-22T06:00:00Z").unwrap();
    let board = w
        .state
        .learner_board_handler()
        .handle(w.as_learner())
        .await
        .unwrap();
    assert!(board.active_cycle.is_none());

    let review = board.review_cycle.unwrap();
    assert_eq!(review.cycle.id(), cycle.id());
    assert_eq!(review.progress.total_completed, 4);
    assert_eq!(review.progress.total_needed, 5);
    assert!(review.progress.boss_unlocked);
    assert!(review.completed_boss_task());
    assert_eq!(review.week_points, 40);
    assert_eq!(review.pending_review, 5);

    // Once settled, the week drops off the board.
    w.state
        .finalize_cycle_handler()
        .handle(FinalizeCycleCommand { cycle_id: cycle.id() }, w.as_tutor())
        .await
        .unwrap();
    let board = w
        .state
        .learner_board_handler()
        .handle(w.as_learner())
        .await
        .unwrap();
    assert!(board.review_cycle.is_none());
}

#[tokio::test]
async fn only_one_cycle_can_be_active_per_learner() {
    let w = World::new().await;
    let this_week = w.draft_cycle((2024, 1, 15)).await;
    let next_week = w.draft_cycle((2024, 1, 22)).await;
    w.add_task(&this_week, "Homework", 5, false).await;
    w.add_task(&next_week, "Homework", 5, false).await;

    w.activate(&this_week).await.unwrap();
    let err = w.activate(&next_week).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ActiveCycleExists);
    assert_eq!(w.store.active_cycle_count(&w.learner.id), 1);

    w.state
        .finalize_cycle_handler()
        .handle(
            FinalizeCycleCommand {
                cycle_id: this_week.id(),
            },
            w.as_tutor(),
        )
        .await
        .unwrap();
    assert!(w.activate(&next_week).await.is_ok());
    assert_eq!(w.store.active_cycle_count(&w.learner.id), 1);
}

#[tokio::test]
async fn overview_is_visible_to_owner_only() {
    let w = World::new().await;
    let cycle = w.draft_cycle((2024, 1, 15)).await;
    let a = w.add_task(&cycle, "Homework", 2, false).await;
    w.activate(&cycle).await.unwrap();
    w.complete(&a).await.unwrap();

    let overview = w
        .state
        .cycle_overview_handler()
        .handle(
            GetCycleOverviewQuery {
                cycle_id: cycle.id(),
            },
            w.as_learner(),
        )
        .await
        .unwrap();
    assert_eq!(overview.tasks.len(), 1);
    assert!(overview.tasks[0].completed_today);
    assert_eq!(overview.tasks[0].remaining_this_week, 1);
    assert_eq!(overview.week_points, 10);

    let stranger = CommandMetadata::new(Principal::tutor(TutorId::new()));
    let err = w
        .state
        .cycle_overview_handler()
        .handle(
            GetCycleOverviewQuery {
                cycle_id: cycle.id(),
            },
            stranger,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}
