//! FinalizeCycleHandler - closes a cycle's review and settles points.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::handlers::access::cycle_for_tutor;
use crate::domain::foundation::{CommandMetadata, CycleId, DomainError};
use crate::ports::{Clock, CycleRepository, LearnerRepository, PointsLedger};

/// Command to finalize a cycle.
#[derive(Debug, Clone)]
pub struct FinalizeCycleCommand {
    pub cycle_id: CycleId,
}

/// Outcome of finalizing a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalizeCycleResult {
    pub cycle_id: CycleId,
    pub auto_approved: u32,
    pub points_awarded: i64,
}

/// Handler for finalizing cycles.
///
/// Auto-approval, point credit and the status change are applied by the
/// ledger in one transaction.
pub struct FinalizeCycleHandler {
    cycles: Arc<dyn CycleRepository>,
    learners: Arc<dyn LearnerRepository>,
    ledger: Arc<dyn PointsLedger>,
    clock: Arc<dyn Clock>,
}

impl FinalizeCycleHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        learners: Arc<dyn LearnerRepository>,
        ledger: Arc<dyn PointsLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            learners,
            ledger,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: FinalizeCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<FinalizeCycleResult, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        let cycle = cycle_for_tutor(
            self.cycles.as_ref(),
            self.learners.as_ref(),
            &tutor_id,
            &cmd.cycle_id,
        )
        .await?;

        if let Err(err) = cycle.ensure_finalizable() {
            debug!(cycle_id = %cmd.cycle_id, status = %cycle.status(), "finalize rejected");
            return Err(err);
        }

        let settlement = self
            .ledger
            .settle_cycle(&cmd.cycle_id, self.clock.now())
            .await?;

        info!(
            cycle_id = %cmd.cycle_id,
            learner_id = %cycle.learner_id(),
            auto_approved = settlement.auto_approved,
            points_awarded = settlement.points_awarded,
            correlation_id = %metadata.correlation_id(),
            "weekly cycle finalized"
        );
        Ok(FinalizeCycleResult {
            cycle_id: cmd.cycle_id,
            auto_approved: settlement.auto_approved,
            points_awarded: settlement.points_awarded,
        })
    }
}
