//! ListLearnersHandler - Query handler for the tutor dashboard.

use std::sync::Arc;

use crate::application::handlers::cycle::{load_overview, CycleSummary, SweepExpiredCyclesHandler};
use crate::domain::foundation::{CommandMetadata, CycleStatus, DomainError, LearnerId, LocalCalendar};
use crate::domain::learner::Learner;
use crate::ports::{Clock, CompletionRepository, CycleRepository, LearnerRepository, TaskRepository};

/// One learner card on the tutor dashboard.
#[derive(Debug, Clone)]
pub struct LearnerSummary {
    pub learner: Learner,
    /// Latest ACTIVE or REVIEW week; the one the tutor reviews and settles.
    pub current_cycle: Option<CycleSummary>,
    /// Latest DRAFT week; the one the tutor is still planning.
    pub draft_cycle: Option<CycleSummary>,
}

/// Lists a tutor's learners, oldest first, with their current weeks.
///
/// Loading the dashboard moves expired cycles into review first, so the
/// tutor never sees a stale ACTIVE week.
pub struct ListLearnersHandler {
    learners: Arc<dyn LearnerRepository>,
    cycles: Arc<dyn CycleRepository>,
    tasks: Arc<dyn TaskRepository>,
    completions: Arc<dyn CompletionRepository>,
    sweeper: Arc<SweepExpiredCyclesHandler>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
}

impl ListLearnersHandler {
    pub fn new(
        learners: Arc<dyn LearnerRepository>,
        cycles: Arc<dyn CycleRepository>,
        tasks: Arc<dyn TaskRepository>,
        completions: Arc<dyn CompletionRepository>,
        sweeper: Arc<SweepExpiredCyclesHandler>,
        clock: Arc<dyn Clock>,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            learners,
            cycles,
            tasks,
            completions,
            sweeper,
            clock,
            calendar,
        }
    }

    pub async fn handle(
        &self,
        metadata: CommandMetadata,
    ) -> Result<Vec<LearnerSummary>, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        self.sweeper.sweep().await?;

        let learners = self.learners.list_by_tutor(&tutor_id).await?;
        let mut summaries = Vec::with_capacity(learners.len());
        for learner in learners {
            let current_cycle = self
                .latest(&learner.id, &[CycleStatus::Active, CycleStatus::Review])
                .await?;
            let draft_cycle = self.latest(&learner.id, &[CycleStatus::Draft]).await?;
            summaries.push(LearnerSummary {
                learner,
                current_cycle,
                draft_cycle,
            });
        }
        Ok(summaries)
    }

    async fn latest(
        &self,
        learner_id: &LearnerId,
        statuses: &[CycleStatus],
    ) -> Result<Option<CycleSummary>, DomainError> {
        let Some(cycle) = self
            .cycles
            .find_latest_for_learner(learner_id, statuses)
            .await?
        else {
            return Ok(None);
        };

        let overview = load_overview(
            self.tasks.as_ref(),
            self.completions.as_ref(),
            cycle,
            &self.calendar,
            &self.clock.now(),
        )
        .await?;
        Ok(Some(overview.summary()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::cycle::{CycleWeek, Task, TaskCompletion, TaskDetails, WeeklyCycle};
    use crate::domain::foundation::{Principal, Timestamp, TutorId};
    use crate::domain::learner::{DisplayName, Pin};
    use chrono::NaiveDate;

    fn handler(store: &Arc<InMemoryStore>, clock: Arc<ManualClock>) -> ListLearnersHandler {
        let sweeper = Arc::new(SweepExpiredCyclesHandler::new(
            store.clone(),
            clock.clone(),
            LocalCalendar::utc(),
        ));
        ListLearnersHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            sweeper,
            clock,
            LocalCalendar::utc(),
        )
    }

    fn learner(tutor: TutorId, name: &str, pin: &str, at: Timestamp) -> Learner {
        Learner::new(
            tutor,
            DisplayName::new(name).unwrap(),
            Pin::new(pin).unwrap(),
            at,
        )
    }

    fn week_of(learner: &Learner, monday: (i32, u32, u32)) -> WeeklyCycle {
        let week = CycleWeek::starting(
            NaiveDate::from_ymd_opt(monday.0, monday.1, monday.2).unwrap(),
        )
        .unwrap();
        WeeklyCycle::new(learner.id, week, learner.created_at)
    }

    #[tokio::test]
    async fn lists_only_own_learners_in_creation_order() {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::at_rfc3339("2024-01-15T09:00:00Z").unwrap());
        let handler = handler(&store, clock);

        let tutor = TutorId::new();
        let first = learner(tutor, "First", "1111", Timestamp::now());
        let second = learner(tutor, "Second", "2222", first.created_at.add_minutes(1));
        let stranger = learner(TutorId::new(), "Other", "3333", Timestamp::now());
        for l in [&second, &first, &stranger] {
            LearnerRepository::create(store.as_ref(), l, 4).await.unwrap();
        }

        let listed = handler
            .handle(CommandMetadata::new(Principal::tutor(tutor)))
            .await
            .unwrap();
        let names: Vec<&str> = listed.iter().map(|l| l.learner.display_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert!(listed.iter().all(|l| l.current_cycle.is_none() && l.draft_cycle.is_none()));
    }

    #[tokio::test]
    async fn shows_the_week_waiting_for_review_and_the_next_draft() {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::at_rfc3339("2024-01-22T09:00:00Z").unwrap());
        let handler = handler(&store, clock);

        let tutor = TutorId::new();
        let kid = learner(tutor, "Ava", "1234", Timestamp::now());
        store.seed_learner(kid.clone());

        // Last week is still ACTIVE; the dashboard read sweeps it into review.
        let last_week = week_of(&kid, (2024, 1, 15));
        let next_week = week_of(&kid, (2024, 1, 29));
        store.seed_cycle(last_week.clone());
        store.seed_cycle(next_week.clone());
        store.force_status(&last_week.id(), CycleStatus::Active);

        let details = TaskDetails::new("Homework", None, None, None, 5, false).unwrap();
        let homework = Task::new(last_week.id(), details, kid.created_at);
        store.seed_task(homework.clone());
        for day in ["2024-01-15T17:00:00Z", "2024-01-16T17:00:00Z"] {
            let at = ManualClock::at_rfc3339(day).unwrap().now();
            store.seed_completion(TaskCompletion::record(&homework, kid.id, at));
        }

        let listed = handler
            .handle(CommandMetadata::new(Principal::tutor(tutor)))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        let current = listed[0].current_cycle.as_ref().unwrap();
        assert_eq!(current.cycle_id, last_week.id());
        assert_eq!(current.status, CycleStatus::Review);
        assert_eq!(current.progress.total_completed, 2);
        assert_eq!(current.progress.total_needed, 5);
        assert_eq!(current.week_points, 20);
        assert_eq!(current.pending_review, 2);

        let draft = listed[0].draft_cycle.as_ref().unwrap();
        assert_eq!(draft.cycle_id, next_week.id());
        assert_eq!(draft.status, CycleStatus::Draft);
    }
}
