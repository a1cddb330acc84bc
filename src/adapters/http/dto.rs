//! Request and response bodies.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    CycleOverview, CycleSummary, FinalizeCycleResult, LearnerBoard, LearnerSummary,
    PendingCompletion, RecordCompletionResult, ReviewCompletionResult, TaskOverview,
};
use crate::domain::cycle::{
    ApprovalState, Progress, ProgressTier, Task, TaskCompletion, WeeklyCycle,
};
use crate::domain::foundation::{
    CompletionId, CycleId, CycleStatus, DomainError, LearnerId, TaskId, Timestamp,
};
use crate::domain::learner::Learner;

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLearnerRequest {
    pub display_name: String,
    pub pin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCycleRequest {
    pub learner_id: LearnerId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTaskRequest {
    pub cycle_id: CycleId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub expectation: Option<String>,
    pub frequency_per_week: i32,
    #[serde(default)]
    pub is_boss_task: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteTaskRequest {
    pub task_id: TaskId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewCompletionRequest {
    pub approved: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        let details = if err.details.is_empty() {
            None
        } else {
            Some(err.details.clone().into_iter().collect())
        };
        Self {
            code: err.code.to_string(),
            message: err.message.clone(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearnerResponse {
    pub id: LearnerId,
    pub display_name: String,
    pub total_points: i64,
    pub created_at: Timestamp,
}

impl From<Learner> for LearnerResponse {
    fn from(learner: Learner) -> Self {
        Self {
            id: learner.id,
            display_name: learner.display_name.as_str().to_string(),
            total_points: learner.total_points,
            created_at: learner.created_at,
        }
    }
}

/// A cycle condensed for the tutor dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummaryResponse {
    pub id: CycleId,
    pub status: CycleStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: ProgressResponse,
    pub week_points: i64,
    pub pending_review: u32,
}

impl From<CycleSummary> for CycleSummaryResponse {
    fn from(s: CycleSummary) -> Self {
        Self {
            id: s.cycle_id,
            status: s.status,
            start_date: s.start_date,
            end_date: s.end_date,
            progress: s.progress.into(),
            week_points: s.week_points,
            pending_review: s.pending_review,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LearnerSummaryResponse {
    #[serde(flatten)]
    pub learner: LearnerResponse,
    pub current_cycle: Option<CycleSummaryResponse>,
    pub draft_cycle: Option<CycleSummaryResponse>,
}

impl From<LearnerSummary> for LearnerSummaryResponse {
    fn from(s: LearnerSummary) -> Self {
        Self {
            learner: s.learner.into(),
            current_cycle: s.current_cycle.map(Into::into),
            draft_cycle: s.draft_cycle.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleResponse {
    pub id: CycleId,
    pub learner_id: LearnerId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CycleStatus,
    pub tutor_reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<WeeklyCycle> for CycleResponse {
    fn from(cycle: WeeklyCycle) -> Self {
        Self {
            id: cycle.id(),
            learner_id: cycle.learner_id(),
            start_date: cycle.start_date(),
            end_date: cycle.end_date(),
            status: cycle.status(),
            tutor_reviewed_at: cycle.tutor_reviewed_at(),
            created_at: cycle.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionResponse {
    pub id: CompletionId,
    pub task_id: TaskId,
    pub learner_id: LearnerId,
    pub cycle_id: CycleId,
    pub points_awarded: i32,
    /// `null` while pending review.
    pub tutor_approved: Option<bool>,
    pub approval: ApprovalState,
    pub completed_at: Timestamp,
}

impl From<TaskCompletion> for CompletionResponse {
    fn from(c: TaskCompletion) -> Self {
        Self {
            id: c.id,
            task_id: c.task_id,
            learner_id: c.learner_id,
            cycle_id: c.cycle_id,
            points_awarded: c.points_awarded,
            tutor_approved: c.approval.as_tutor_approved(),
            approval: c.approval,
            completed_at: c.completed_at,
        }
    }
}

/// Progress plus the derived presentation fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub total_needed: u32,
    pub total_completed: u32,
    pub progress_ratio: f64,
    pub boss_unlocked: bool,
    pub tasks_remaining_for_boss: u32,
    pub progress_text: String,
    pub encouragement: String,
    pub tier: ProgressTier,
}

impl From<Progress> for ProgressResponse {
    fn from(p: Progress) -> Self {
        Self {
            total_needed: p.total_needed,
            total_completed: p.total_completed,
            progress_ratio: p.ratio(),
            boss_unlocked: p.boss_unlocked,
            tasks_remaining_for_boss: p.tasks_remaining_for_boss,
            progress_text: p.progress_text(),
            encouragement: p.encouragement(),
            tier: p.tier(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskOverviewResponse {
    #[serde(flatten)]
    pub task: Task,
    pub times_completed: u32,
    pub completed_today: bool,
    pub remaining_this_week: u32,
    /// Boss tasks stay locked until progress unlocks them.
    pub is_locked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleOverviewResponse {
    pub cycle: CycleResponse,
    pub tasks: Vec<TaskOverviewResponse>,
    pub progress: ProgressResponse,
    pub week_points: i64,
}

impl From<CycleOverview> for CycleOverviewResponse {
    fn from(overview: CycleOverview) -> Self {
        let boss_unlocked = overview.progress.boss_unlocked;
        Self {
            cycle: overview.cycle.into(),
            tasks: overview
                .tasks
                .into_iter()
                .map(|t: TaskOverview| TaskOverviewResponse {
                    is_locked: t.task.is_boss_task && !boss_unlocked,
                    task: t.task,
                    times_completed: t.times_completed,
                    completed_today: t.completed_today,
                    remaining_this_week: t.remaining_this_week,
                })
                .collect(),
            progress: overview.progress.into(),
            week_points: overview.week_points,
        }
    }
}

/// The finished week a learner looks back on while the tutor reviews it.
#[derive(Debug, Clone, Serialize)]
pub struct WeekReviewResponse {
    #[serde(flatten)]
    pub overview: CycleOverviewResponse,
    pub reached_boss_threshold: bool,
    pub completed_boss_task: bool,
}

impl From<CycleOverview> for WeekReviewResponse {
    fn from(overview: CycleOverview) -> Self {
        let completed_boss_task = overview.completed_boss_task();
        let reached_boss_threshold = overview.progress.boss_unlocked;
        Self {
            overview: overview.into(),
            reached_boss_threshold,
            completed_boss_task,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LearnerBoardResponse {
    pub learner: LearnerResponse,
    pub active_cycle: Option<CycleOverviewResponse>,
    pub review_cycle: Option<WeekReviewResponse>,
}

impl From<LearnerBoard> for LearnerBoardResponse {
    fn from(board: LearnerBoard) -> Self {
        Self {
            learner: board.learner.into(),
            active_cycle: board.active_cycle.map(Into::into),
            review_cycle: board.review_cycle.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordCompletionResponse {
    pub completion: CompletionResponse,
    pub progress: ProgressResponse,
    pub just_unlocked_boss: bool,
    pub week_points: i64,
}

impl From<RecordCompletionResult> for RecordCompletionResponse {
    fn from(r: RecordCompletionResult) -> Self {
        Self {
            completion: r.completion.into(),
            progress: r.progress.into(),
            just_unlocked_boss: r.just_unlocked_boss,
            week_points: r.week_points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewCompletionResponse {
    pub completion: CompletionResponse,
    pub points_credited: i32,
}

impl From<ReviewCompletionResult> for ReviewCompletionResponse {
    fn from(r: ReviewCompletionResult) -> Self {
        Self {
            completion: r.completion.into(),
            points_credited: r.points_credited,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingCompletionResponse {
    #[serde(flatten)]
    pub completion: CompletionResponse,
    pub task_title: String,
    pub is_boss_task: bool,
}

impl From<PendingCompletion> for PendingCompletionResponse {
    fn from(p: PendingCompletion) -> Self {
        Self {
            completion: p.completion.into(),
            task_title: p.task_title,
            is_boss_task: p.is_boss_task,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeCycleResponse {
    pub cycle_id: CycleId,
    pub auto_approved: u32,
    pub points_awarded: i64,
}

impl From<FinalizeCycleResult> for FinalizeCycleResponse {
    fn from(r: FinalizeCycleResult) -> Self {
        Self {
            cycle_id: r.cycle_id,
            auto_approved: r.auto_approved,
            points_awarded: r.points_awarded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub moved_to_review: u64,
}
