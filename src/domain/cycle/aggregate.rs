//! WeeklyCycle aggregate - the lifecycle root for a learner's week.
//!
//! The aggregate validates transitions against its own state. Invariants
//! that span several cycles (one ACTIVE cycle per learner) are enforced by
//! the repository with conditional writes.

use chrono::NaiveDate;

use crate::domain::foundation::{
    CycleId, CycleStatus, DomainError, ErrorCode, LearnerId, LocalCalendar, OwnedByLearner,
    StateMachine, Timestamp,
};

use super::rules::{MAX_BOSS_TASKS, MAX_WEEKLY_TASKS};
use super::CycleWeek;

/// A learner's one-week task assignment period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyCycle {
    id: CycleId,
    learner_id: LearnerId,
    week: CycleWeek,
    status: CycleStatus,
    tutor_reviewed_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl WeeklyCycle {
    /// Creates a new cycle in `Draft`.
    pub fn new(learner_id: LearnerId, week: CycleWeek, now: Timestamp) -> Self {
        Self {
            id: CycleId::new(),
            learner_id,
            week,
            status: CycleStatus::Draft,
            tutor_reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a cycle from persisted data.
    pub fn reconstitute(
        id: CycleId,
        learner_id: LearnerId,
        week: CycleWeek,
        status: CycleStatus,
        tutor_reviewed_at: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            learner_id,
            week,
            status,
            tutor_reviewed_at,
            created_at,
            updated_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn learner_id(&self) -> LearnerId {
        self.learner_id
    }

    pub fn week(&self) -> CycleWeek {
        self.week
    }

    pub fn start_date(&self) -> NaiveDate {
        self.week.start_date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.week.end_date()
    }

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    pub fn tutor_reviewed_at(&self) -> Option<Timestamp> {
        self.tutor_reviewed_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ───────────────────────────────────────────────────────────────
    // Task editing guards
    // ───────────────────────────────────────────────────────────────

    /// Tasks cannot be added or removed during the active week.
    pub fn ensure_unlocked(&self) -> Result<(), DomainError> {
        if self.status.is_locked() {
            return Err(DomainError::new(
                ErrorCode::CycleLocked,
                "Tasks cannot be changed while the cycle is active",
            )
            .with_detail("cycle_id", self.id.to_string()));
        }
        Ok(())
    }

    /// Checks the per-cycle task caps before adding one more task.
    pub fn ensure_task_capacity(
        &self,
        task_count: usize,
        boss_count: usize,
        adding_boss: bool,
    ) -> Result<(), DomainError> {
        self.ensure_unlocked()?;
        if task_count >= MAX_WEEKLY_TASKS {
            return Err(DomainError::new(
                ErrorCode::MaxTasksReached,
                format!("A cycle can hold at most {} tasks", MAX_WEEKLY_TASKS),
            ));
        }
        if adding_boss && boss_count >= MAX_BOSS_TASKS {
            return Err(DomainError::new(
                ErrorCode::MaxBossTasksReached,
                format!("A cycle can hold at most {} boss tasks", MAX_BOSS_TASKS),
            ));
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Lifecycle
    // ───────────────────────────────────────────────────────────────

    /// Moves a draft cycle with at least one task to `Active`.
    ///
    /// The single-active check against other cycles happens in storage.
    pub fn activate(&mut self, task_count: usize, now: Timestamp) -> Result<(), DomainError> {
        if self.status == CycleStatus::Active {
            return Err(DomainError::new(
                ErrorCode::AlreadyActive,
                "This cycle is already active",
            ));
        }
        let next = self.status.transition_to(CycleStatus::Active)?;
        if task_count == 0 {
            return Err(DomainError::new(
                ErrorCode::NoTasks,
                "Add at least one task before activating the cycle",
            ));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// True if the cycle is active and `today` (a local date) is past its end date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.status == CycleStatus::Active && self.end_date() < today
    }

    /// Moves an expired active cycle into `Review`.
    pub fn move_to_review(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(CycleStatus::Review)?;
        self.updated_at = now;
        Ok(())
    }

    /// Checks that a learner may record completions right now.
    ///
    /// Only the end date gates play; a cycle activated before its start date
    /// is immediately playable.
    pub fn ensure_playable(
        &self,
        calendar: &LocalCalendar,
        now: &Timestamp,
    ) -> Result<(), DomainError> {
        if self.status != CycleStatus::Active {
            return Err(DomainError::new(
                ErrorCode::NoActiveCycle,
                "This task is not part of an active cycle",
            )
            .with_detail("status", self.status.as_str()));
        }
        if calendar.is_after_day(self.end_date(), now) {
            return Err(DomainError::new(
                ErrorCode::CycleEnded,
                "This week's cycle has ended",
            )
            .with_detail("end_date", self.end_date().to_string()));
        }
        Ok(())
    }

    /// Checks that the tutor may finalize the cycle.
    pub fn ensure_finalizable(&self) -> Result<(), DomainError> {
        if !self.status.is_finalizable() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot complete a cycle in {} status", self.status),
            )
            .with_detail("status", self.status.as_str()));
        }
        Ok(())
    }

    /// Marks the cycle `Completed` and stamps the review time.
    pub fn finalize(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_finalizable()?;
        self.status = self.status.transition_to(CycleStatus::Completed)?;
        self.tutor_reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

impl OwnedByLearner for WeeklyCycle {
    fn learner_id(&self) -> &LearnerId {
        &self.learner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(rfc3339: &str) -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn draft() -> WeeklyCycle {
        let week = CycleWeek::starting(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).unwrap();
        WeeklyCycle::new(LearnerId::new(), week, at("2024-01-14T12:00:00Z"))
    }

    fn active() -> WeeklyCycle {
        let mut cycle = draft();
        cycle.activate(1, at("2024-01-14T12:00:00Z")).unwrap();
        cycle
    }

    #[test]
    fn new_cycle_is_draft_and_unreviewed() {
        let cycle = draft();
        assert_eq!(cycle.status(), CycleStatus::Draft);
        assert!(cycle.tutor_reviewed_at().is_none());
    }

    #[test]
    fn activate_requires_tasks() {
        let mut cycle = draft();
        let err = cycle.activate(0, Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoTasks);
        assert_eq!(cycle.status(), CycleStatus::Draft);
    }

    #[test]
    fn activate_twice_is_already_active() {
        let mut cycle = active();
        let err = cycle.activate(3, Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyActive);
    }

    #[test]
    fn activate_from_review_is_invalid_transition() {
        let mut cycle = active();
        cycle.move_to_review(Timestamp::now()).unwrap();
        let err = cycle.activate(3, Timestamp::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn active_cycle_is_locked_for_task_edits() {
        assert!(draft().ensure_unlocked().is_ok());
        assert_eq!(
            active().ensure_unlocked().unwrap_err().code,
            ErrorCode::CycleLocked
        );
    }

    #[test]
    fn task_capacity_caps_total_and_boss() {
        let cycle = draft();
        assert!(cycle.ensure_task_capacity(11, 2, false).is_ok());
        assert_eq!(
            cycle.ensure_task_capacity(12, 0, false).unwrap_err().code,
            ErrorCode::MaxTasksReached
        );
        assert_eq!(
            cycle.ensure_task_capacity(5, 2, true).unwrap_err().code,
            ErrorCode::MaxBossTasksReached
        );
    }

    #[test]
    fn playable_until_end_of_sunday() {
        let cal = LocalCalendar::utc();
        let cycle = active();
        assert!(cycle
            .ensure_playable(&cal, &at("2024-01-21T23:59:59.999Z"))
            .is_ok());
        assert_eq!(
            cycle
                .ensure_playable(&cal, &at("2024-01-22T00:00:00Z"))
                .unwrap_err()
                .code,
            ErrorCode::CycleEnded
        );
    }

    #[test]
    fn playable_before_nominal_start() {
        let cal = LocalCalendar::utc();
        assert!(active()
            .ensure_playable(&cal, &at("2024-01-13T08:00:00Z"))
            .is_ok());
    }

    #[test]
    fn draft_is_not_playable() {
        let err = draft()
            .ensure_playable(&LocalCalendar::utc(), &at("2024-01-16T08:00:00Z"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoActiveCycle);
    }

    #[test]
    fn expiry_respects_local_offset() {
        // UTC+2: local Monday starts at 22:00 UTC on Sunday.
        let cal = LocalCalendar::from_offset_minutes(120).unwrap();
        let cycle = active();
        assert!(!cycle.is_expired(cal.date_of(&at("2024-01-21T21:59:59Z"))));
        assert!(cycle.is_expired(cal.date_of(&at("2024-01-21T22:00:00Z"))));
    }

    #[test]
    fn finalize_from_active_or_review() {
        let now = at("2024-01-22T09:00:00Z");

        let mut from_active = active();
        from_active.finalize(now).unwrap();
        assert_eq!(from_active.status(), CycleStatus::Completed);
        assert_eq!(from_active.tutor_reviewed_at(), Some(now));

        let mut from_review = active();
        from_review.move_to_review(now).unwrap();
        from_review.finalize(now).unwrap();
        assert_eq!(from_review.status(), CycleStatus::Completed);
    }

    #[test]
    fn finalize_draft_or_completed_is_rejected() {
        let now = Timestamp::now();
        let mut cycle = draft();
        assert_eq!(
            cycle.finalize(now).unwrap_err().code,
            ErrorCode::InvalidStateTransition
        );

        let mut done = active();
        done.finalize(now).unwrap();
        assert_eq!(
            done.finalize(now).unwrap_err().code,
            ErrorCode::InvalidStateTransition
        );
    }
}
