//! ReviewCompletionHandler - tutor approves or rejects a pending completion.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::handlers::access::cycle_for_tutor;
use crate::domain::cycle::TaskCompletion;
use crate::domain::foundation::{CommandMetadata, CompletionId, DomainError, ErrorCode};
use crate::ports::{CompletionRepository, CycleRepository, LearnerRepository, PointsLedger};

/// Command to review a completion.
#[derive(Debug, Clone)]
pub struct ReviewCompletionCommand {
    pub completion_id: CompletionId,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewCompletionResult {
    pub completion: TaskCompletion,
    /// Lifetime points credited by this decision.
    pub points_credited: i32,
}

pub struct ReviewCompletionHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    completions: Arc<dyn CompletionRepository>,
    ledger: Arc<dyn PointsLedger>,
}

impl ReviewCompletionHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        completions: Arc<dyn CompletionRepository>,
        ledger: Arc<dyn PointsLedger>,
    ) -> Self {
        Self {
            cycles,
            learners,
            completions,
            ledger,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReviewCompletionCommand,
        metadata: CommandMetadata,
    ) -> Result<ReviewCompletionResult, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        let completion = self
            .completions
            .find_by_id(&cmd.completion_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::CompletionNotFound, "Completion not found")
                    .with_detail("completion_id", cmd.completion_id.to_string())
            })?;

        cycle_for_tutor(
            self.cycles.as_ref(),
            self.learners.as_ref(),
            &tutor_id,
            &completion.cycle_id,
        )
        .await?;

        if !completion.approval.is_pending() {
            debug!(completion_id = %cmd.completion_id, "completion already reviewed");
            return Err(DomainError::new(
                ErrorCode::AlreadyReviewed,
                "This completion has already been reviewed",
            )
            .with_detail("completion_id", cmd.completion_id.to_string()));
        }

        let reviewed = self
            .ledger
            .review_completion(&cmd.completion_id, cmd.approved)
            .await?;
        let points_credited = reviewed.lifetime_credit();

        info!(
            completion_id = %cmd.completion_id,
            learner_id = %reviewed.learner_id,
            approved = cmd.approved,
            points_credited,
            correlation_id = %metadata.correlation_id(),
            "completion reviewed"
        );
        Ok(ReviewCompletionResult {
            completion: reviewed,
            points_credited,
        })
    }
}
