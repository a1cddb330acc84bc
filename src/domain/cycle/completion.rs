//! TaskCompletion entity - an append-only record of one learner action.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CompletionId, CycleId, DomainError, ErrorCode, LearnerId, OwnedByLearner, TaskId, Timestamp,
};

use super::Task;

/// Tutor decision on a completion.
///
/// Stored as a nullable boolean: `NULL` pending, `true` approved,
/// `false` rejected. The only permitted change is Pending to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalState {
    pub fn from_tutor_approved(value: Option<bool>) -> Self {
        match value {
            None => ApprovalState::Pending,
            Some(true) => ApprovalState::Approved,
            Some(false) => ApprovalState::Rejected,
        }
    }

    pub fn as_tutor_approved(&self) -> Option<bool> {
        match self {
            ApprovalState::Pending => None,
            ApprovalState::Approved => Some(true),
            ApprovalState::Rejected => Some(false),
        }
    }

    /// Pending and approved completions both count as done.
    pub fn counts_toward_progress(&self) -> bool {
        !matches!(self, ApprovalState::Rejected)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ApprovalState::Pending)
    }
}

/// One completion of a task by a learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub id: CompletionId,
    pub task_id: TaskId,
    pub learner_id: LearnerId,
    pub cycle_id: CycleId,
    /// Captured from the task at creation time.
    pub points_awarded: i32,
    pub approval: ApprovalState,
    pub completed_at: Timestamp,
}

impl TaskCompletion {
    /// Records a new pending completion of `task`.
    pub fn record(task: &Task, learner_id: LearnerId, now: Timestamp) -> Self {
        Self {
            id: CompletionId::new(),
            task_id: task.id,
            learner_id,
            cycle_id: task.cycle_id,
            points_awarded: task.point_value,
            approval: ApprovalState::Pending,
            completed_at: now,
        }
    }

    /// Applies the tutor's decision and returns the lifetime points it earns.
    ///
    /// # Errors
    ///
    /// `AlreadyReviewed` if the completion is no longer pending.
    pub fn review(&mut self, approved: bool) -> Result<i32, DomainError> {
        if !self.approval.is_pending() {
            return Err(DomainError::new(
                ErrorCode::AlreadyReviewed,
                "This completion has already been reviewed",
            )
            .with_detail("completion_id", self.id.to_string()));
        }
        self.approval = ApprovalState::from_tutor_approved(Some(approved));
        Ok(self.lifetime_credit())
    }

    /// Points this completion contributes to the learner's lifetime total.
    pub fn lifetime_credit(&self) -> i32 {
        match self.approval {
            ApprovalState::Approved => self.points_awarded.max(0),
            _ => 0,
        }
    }
}

impl OwnedByLearner for TaskCompletion {
    fn learner_id(&self) -> &LearnerId {
        &self.learner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::TaskDetails;

    fn task(boss: bool) -> Task {
        let details = TaskDetails::new("Feed the cat", None, None, None, 7, boss).unwrap();
        Task::new(CycleId::new(), details, Timestamp::now())
    }

    #[test]
    fn record_captures_task_points_and_starts_pending() {
        let t = task(false);
        let c = TaskCompletion::record(&t, LearnerId::new(), Timestamp::now());
        assert_eq!(c.points_awarded, 10);
        assert_eq!(c.cycle_id, t.cycle_id);
        assert!(c.approval.is_pending());
    }

    #[test]
    fn approving_regular_completion_credits_points() {
        let mut c = TaskCompletion::record(&task(false), LearnerId::new(), Timestamp::now());
        assert_eq!(c.review(true).unwrap(), 10);
        assert_eq!(c.approval, ApprovalState::Approved);
    }

    #[test]
    fn approving_boss_completion_credits_nothing() {
        let mut c = TaskCompletion::record(&task(true), LearnerId::new(), Timestamp::now());
        assert_eq!(c.review(true).unwrap(), 0);
    }

    #[test]
    fn rejecting_keeps_points_as_history_but_credits_nothing() {
        let mut c = TaskCompletion::record(&task(false), LearnerId::new(), Timestamp::now());
        assert_eq!(c.review(false).unwrap(), 0);
        assert_eq!(c.points_awarded, 10);
        assert!(!c.approval.counts_toward_progress());
    }

    #[test]
    fn second_review_is_rejected() {
        let mut c = TaskCompletion::record(&task(false), LearnerId::new(), Timestamp::now());
        c.review(false).unwrap();
        let err = c.review(true).unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyReviewed);
        assert_eq!(c.approval, ApprovalState::Rejected);
    }

    #[test]
    fn approval_state_maps_nullable_boolean() {
        for value in [None, Some(true), Some(false)] {
            assert_eq!(ApprovalState::from_tutor_approved(value).as_tutor_approved(), value);
        }
    }
}
