//! `InMemoryStore` - every persistence port over one locked state.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::cycle::{Task, TaskCompletion, WeeklyCycle};
use crate::domain::foundation::{
    CompletionId, CycleId, CycleStatus, DomainError, ErrorCode, LearnerId, TaskId, Timestamp,
    TutorId,
};
use crate::domain::learner::Learner;
use crate::ports::{
    CompletionGuard, CompletionRepository, CycleRepository, CycleSettlement, LearnerRepository,
    PointsLedger, TaskRepository,
};

/// Tables kept in insertion order; lists sort stably by time on read.
#[derive(Default)]
struct State {
    learners: Vec<Learner>,
    cycles: Vec<WeeklyCycle>,
    tasks: Vec<Task>,
    completions: Vec<TaskCompletion>,
}

impl State {
    fn cycle_mut(&mut self, id: &CycleId) -> Option<&mut WeeklyCycle> {
        self.cycles.iter_mut().find(|c| c.id() == *id)
    }

    fn cycle(&self, id: &CycleId) -> Option<&WeeklyCycle> {
        self.cycles.iter().find(|c| c.id() == *id)
    }

    fn has_other_active(&self, learner_id: &LearnerId, except: &CycleId) -> bool {
        self.cycles.iter().any(|c| {
            c.learner_id() == *learner_id && c.status() == CycleStatus::Active && c.id() != *except
        })
    }
}

/// In-process implementation of all persistence ports.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

fn poisoned() -> DomainError {
    DomainError::new(ErrorCode::InternalError, "in-memory store lock poisoned")
}

fn cycle_not_found(id: &CycleId) -> DomainError {
    DomainError::new(ErrorCode::CycleNotFound, "Weekly cycle not found")
        .with_detail("cycle_id", id.to_string())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DomainError> {
        self.state.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DomainError> {
        self.state.write().map_err(|_| poisoned())
    }

    // === Seeding and inspection helpers ===
    //
    // These bypass every guard. They exist for tests and local fixtures only.

    fn seed(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn peek(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_learner(&self, learner: Learner) {
        self.seed().learners.push(learner);
    }

    pub fn seed_cycle(&self, cycle: WeeklyCycle) {
        self.seed().cycles.push(cycle);
    }

    pub fn seed_task(&self, task: Task) {
        self.seed().tasks.push(task);
    }

    pub fn seed_completion(&self, completion: TaskCompletion) {
        self.seed().completions.push(completion);
    }

    /// Overwrites a cycle's status without checking the state machine.
    pub fn force_status(&self, id: &CycleId, status: CycleStatus) {
        let mut state = self.seed();
        if let Some(cycle) = state.cycle_mut(id) {
            *cycle = WeeklyCycle::reconstitute(
                cycle.id(),
                cycle.learner_id(),
                cycle.week(),
                status,
                cycle.tutor_reviewed_at(),
                cycle.created_at(),
                cycle.updated_at(),
            );
        }
    }

    pub fn learner(&self, id: &LearnerId) -> Option<Learner> {
        self.peek().learners.iter().find(|l| l.id == *id).cloned()
    }

    pub fn cycle(&self, id: &CycleId) -> Option<WeeklyCycle> {
        self.peek().cycle(id).cloned()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.peek().tasks.iter().find(|t| t.id == *id).cloned()
    }

    pub fn completion(&self, id: &CompletionId) -> Option<TaskCompletion> {
        self.peek().completions.iter().find(|c| c.id == *id).cloned()
    }

    pub fn active_cycle_count(&self, learner_id: &LearnerId) -> usize {
        self.peek()
            .cycles
            .iter()
            .filter(|c| c.learner_id() == *learner_id && c.status() == CycleStatus::Active)
            .count()
    }
}

#[async_trait]
impl LearnerRepository for InMemoryStore {
    async fn create(&self, learner: &Learner, max_per_tutor: usize) -> Result<(), DomainError> {
        let mut state = self.write()?;
        let siblings: Vec<&Learner> = state
            .learners
            .iter()
            .filter(|l| l.tutor_id == learner.tutor_id)
            .collect();
        if siblings.len() >= max_per_tutor {
            return Err(DomainError::new(
                ErrorCode::MaxLearnersReached,
                format!("A tutor can have at most {} learners", max_per_tutor),
            ));
        }
        if siblings.iter().any(|l| l.pin == learner.pin) {
            return Err(DomainError::new(
                ErrorCode::PinAlreadyUsed,
                "Another learner already uses this PIN",
            ));
        }
        state.learners.push(learner.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LearnerId) -> Result<Option<Learner>, DomainError> {
        Ok(self.read()?.learners.iter().find(|l| l.id == *id).cloned())
    }

    async fn list_by_tutor(&self, tutor_id: &TutorId) -> Result<Vec<Learner>, DomainError> {
        let mut learners: Vec<Learner> = self
            .read()?
            .learners
            .iter()
            .filter(|l| l.tutor_id == *tutor_id)
            .cloned()
            .collect();
        learners.sort_by_key(|l| l.created_at);
        Ok(learners)
    }
}

#[async_trait]
impl CycleRepository for InMemoryStore {
    async fn create(&self, cycle: &WeeklyCycle) -> Result<(), DomainError> {
        self.write()?.cycles.push(cycle.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CycleId) -> Result<Option<WeeklyCycle>, DomainError> {
        Ok(self.read()?.cycle(id).cloned())
    }

    async fn find_active_for_learner(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<WeeklyCycle>, DomainError> {
        Ok(self
            .read()?
            .cycles
            .iter()
            .find(|c| c.learner_id() == *learner_id && c.status() == CycleStatus::Active)
            .cloned())
    }

    async fn find_latest_for_learner(
        &self,
        learner_id: &LearnerId,
        statuses: &[CycleStatus],
    ) -> Result<Option<WeeklyCycle>, DomainError> {
        Ok(self
            .read()?
            .cycles
            .iter()
            .filter(|c| c.learner_id() == *learner_id && statuses.contains(&c.status()))
            .max_by_key(|c| (c.start_date(), c.created_at()))
            .cloned())
    }

    async fn activate(&self, id: &CycleId, now: Timestamp) -> Result<WeeklyCycle, DomainError> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        let task_count = state.tasks.iter().filter(|t| t.cycle_id == *id).count();
        let mut cycle = state.cycle(id).cloned().ok_or_else(|| cycle_not_found(id))?;
        cycle.activate(task_count, now)?;

        if state.has_other_active(&cycle.learner_id(), id) {
            return Err(DomainError::new(
                ErrorCode::ActiveCycleExists,
                "This learner already has an active cycle",
            ));
        }

        if let Some(stored) = state.cycle_mut(id) {
            *stored = cycle.clone();
        }
        Ok(cycle)
    }

    async fn sweep_expired(&self, today: NaiveDate, now: Timestamp) -> Result<u64, DomainError> {
        let mut state = self.write()?;
        let mut moved = 0;
        for cycle in state
            .cycles
            .iter_mut()
            .filter(|c| c.is_expired(today))
        {
            cycle.move_to_review(now)?;
            moved += 1;
        }
        Ok(moved)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create(&self, task: &Task) -> Result<(), DomainError> {
        let mut state = self.write()?;
        let cycle = state
            .cycle(&task.cycle_id)
            .ok_or_else(|| cycle_not_found(&task.cycle_id))?;
        let siblings: Vec<&Task> = state
            .tasks
            .iter()
            .filter(|t| t.cycle_id == task.cycle_id)
            .collect();
        let boss_count = siblings.iter().filter(|t| t.is_boss_task).count();
        cycle.ensure_task_capacity(siblings.len(), boss_count, task.is_boss_task)?;
        state.tasks.push(task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        Ok(self.read()?.tasks.iter().find(|t| t.id == *id).cloned())
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Task>, DomainError> {
        let mut tasks: Vec<Task> = self
            .read()?
            .tasks
            .iter()
            .filter(|t| t.cycle_id == *cycle_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), DomainError> {
        let mut state = self.write()?;
        let position = state
            .tasks
            .iter()
            .position(|t| t.id == *id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::TaskNotFound, "Task not found")
                    .with_detail("task_id", id.to_string())
            })?;

        if let Some(cycle) = state.cycle(&state.tasks[position].cycle_id) {
            cycle.ensure_unlocked()?;
        }
        if state.completions.iter().any(|c| c.task_id == *id) {
            return Err(DomainError::new(
                ErrorCode::HasCompletions,
                "Tasks with completions cannot be deleted",
            ));
        }
        state.tasks.remove(position);
        Ok(())
    }
}

#[async_trait]
impl CompletionRepository for InMemoryStore {
    async fn insert_guarded(
        &self,
        completion: &TaskCompletion,
        guard: CompletionGuard,
    ) -> Result<(), DomainError> {
        let mut state = self.write()?;

        let active = state
            .cycle(&completion.cycle_id)
            .map(|c| c.status() == CycleStatus::Active)
            .unwrap_or(false);
        if !active {
            return Err(DomainError::new(
                ErrorCode::NoActiveCycle,
                "This task is not part of an active cycle",
            ));
        }

        let mine: Vec<&TaskCompletion> = state
            .completions
            .iter()
            .filter(|c| c.task_id == completion.task_id && c.learner_id == completion.learner_id)
            .collect();
        let cap = usize::try_from(guard.frequency_per_week).unwrap_or(0);
        if mine.len() >= cap {
            return Err(DomainError::new(
                ErrorCode::FrequencyExceeded,
                "You've already completed this task the maximum times this week",
            ));
        }
        if mine.iter().any(|c| guard.today.contains(&c.completed_at)) {
            return Err(DomainError::new(
                ErrorCode::AlreadyCompletedToday,
                "You already completed this task today. Come back tomorrow!",
            ));
        }

        state.completions.push(completion.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CompletionId) -> Result<Option<TaskCompletion>, DomainError> {
        Ok(self.read()?.completions.iter().find(|c| c.id == *id).cloned())
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<TaskCompletion>, DomainError> {
        self.collect_completions(|c| c.cycle_id == *cycle_id)
    }

    async fn list_for_task(
        &self,
        task_id: &TaskId,
        learner_id: &LearnerId,
    ) -> Result<Vec<TaskCompletion>, DomainError> {
        self.collect_completions(|c| c.task_id == *task_id && c.learner_id == *learner_id)
    }

    async fn list_pending_by_cycle(
        &self,
        cycle_id: &CycleId,
    ) -> Result<Vec<TaskCompletion>, DomainError> {
        self.collect_completions(|c| c.cycle_id == *cycle_id && c.approval.is_pending())
    }
}

impl InMemoryStore {
    fn collect_completions<F>(&self, predicate: F) -> Result<Vec<TaskCompletion>, DomainError>
    where
        F: Fn(&TaskCompletion) -> bool,
    {
        let mut completions: Vec<TaskCompletion> = self
            .read()?
            .completions
            .iter()
            .filter(|&c| predicate(c))
            .cloned()
            .collect();
        completions.sort_by_key(|c| c.completed_at);
        Ok(completions)
    }
}

#[async_trait]
impl PointsLedger for InMemoryStore {
    async fn review_completion(
        &self,
        id: &CompletionId,
        approved: bool,
    ) -> Result<TaskCompletion, DomainError> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        let completion = state
            .completions
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::CompletionNotFound, "Completion not found")
                    .with_detail("completion_id", id.to_string())
            })?;

        let mut reviewed = completion.clone();
        let credit = reviewed.review(approved)?;
        if credit > 0 {
            let learner = state
                .learners
                .iter_mut()
                .find(|l| l.id == reviewed.learner_id)
                .ok_or_else(|| {
                    DomainError::new(ErrorCode::LearnerNotFound, "Learner not found")
                })?;
            learner.total_points += i64::from(credit);
        }
        *completion = reviewed.clone();
        Ok(reviewed)
    }

    async fn settle_cycle(
        &self,
        cycle_id: &CycleId,
        reviewed_at: Timestamp,
    ) -> Result<CycleSettlement, DomainError> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        // Validate everything before the first write so a failure leaves
        // the state untouched.
        let mut cycle = state
            .cycle(cycle_id)
            .cloned()
            .ok_or_else(|| cycle_not_found(cycle_id))?;
        cycle.finalize(reviewed_at)?;
        let learner_index = state
            .learners
            .iter()
            .position(|l| l.id == cycle.learner_id())
            .ok_or_else(|| DomainError::new(ErrorCode::LearnerNotFound, "Learner not found"))?;

        let mut auto_approved = 0u32;
        let mut points_awarded = 0i64;
        for completion in state
            .completions
            .iter_mut()
            .filter(|c| c.cycle_id == *cycle_id && c.approval.is_pending())
        {
            points_awarded += i64::from(completion.review(true)?);
            auto_approved += 1;
        }

        state.learners[learner_index].total_points += points_awarded;
        if let Some(stored) = state.cycle_mut(cycle_id) {
            *stored = cycle;
        }

        Ok(CycleSettlement {
            auto_approved,
            points_awarded,
        })
    }
}
