//! Points ledger port.
//!
//! Every write that can change a learner's lifetime points goes through
//! here, so the approval write and the point credit always commit together.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::cycle::TaskCompletion;
use crate::domain::foundation::{CompletionId, CycleId, DomainError, Timestamp};

/// Result of settling a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSettlement {
    /// Pending completions auto-approved by the settlement.
    pub auto_approved: u32,
    /// Points credited to the learner by the settlement.
    pub points_awarded: i64,
}

#[async_trait]
pub trait PointsLedger: Send + Sync {
    /// Record the tutor's decision on a pending completion.
    ///
    /// In one transaction: flip `tutor_approved` from null to `approved` and,
    /// when approved with positive points, atomically increment the learner's
    /// lifetime total.
    ///
    /// # Errors
    ///
    /// - `CompletionNotFound`
    /// - `AlreadyReviewed` if the completion was decided already
    /// - `DatabaseError` on failure; nothing was applied
    async fn review_completion(
        &self,
        id: &CompletionId,
        approved: bool,
    ) -> Result<TaskCompletion, DomainError>;

    /// Close out a cycle.
    ///
    /// In one transaction: auto-approve every pending completion, credit the
    /// sum of their points, set the cycle COMPLETED and stamp `reviewed_at`.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound`
    /// - `InvalidStateTransition` unless the cycle is ACTIVE or REVIEW
    /// - `DatabaseError` on failure; nothing was applied
    async fn settle_cycle(
        &self,
        cycle_id: &CycleId,
        reviewed_at: Timestamp,
    ) -> Result<CycleSettlement, DomainError>;
}
