//! Ownership-chain lookups shared by handlers.
//!
//! Every chain is resolved with id lookups through the ports:
//! completion/task → cycle → learner → tutor.

use crate::domain::cycle::WeeklyCycle;
use crate::domain::foundation::{
    CycleId, DomainError, ErrorCode, LearnerId, OwnedByLearner, OwnedByTutor, Principal, Role,
    TutorId,
};
use crate::domain::learner::Learner;
use crate::ports::{CycleRepository, LearnerRepository};

pub(crate) async fn load_learner(
    learners: &dyn LearnerRepository,
    learner_id: &LearnerId,
) -> Result<Learner, DomainError> {
    learners.find_by_id(learner_id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::LearnerNotFound, "Learner not found")
            .with_detail("learner_id", learner_id.to_string())
    })
}

pub(crate) async fn load_cycle(
    cycles: &dyn CycleRepository,
    cycle_id: &CycleId,
) -> Result<WeeklyCycle, DomainError> {
    cycles.find_by_id(cycle_id).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::CycleNotFound, "Weekly cycle not found")
            .with_detail("cycle_id", cycle_id.to_string())
    })
}

/// Loads a learner and checks it belongs to `tutor_id`.
pub(crate) async fn owned_learner(
    learners: &dyn LearnerRepository,
    tutor_id: &TutorId,
    learner_id: &LearnerId,
) -> Result<Learner, DomainError> {
    let learner = load_learner(learners, learner_id).await?;
    learner.check_tutor(tutor_id)?;
    Ok(learner)
}

/// Loads a cycle and checks its learner belongs to `tutor_id`.
pub(crate) async fn cycle_for_tutor(
    cycles: &dyn CycleRepository,
    learners: &dyn LearnerRepository,
    tutor_id: &TutorId,
    cycle_id: &CycleId,
) -> Result<WeeklyCycle, DomainError> {
    let cycle = load_cycle(cycles, cycle_id).await?;
    owned_learner(learners, tutor_id, &cycle.learner_id()).await?;
    Ok(cycle)
}

/// Loads a cycle visible to the principal: its learner, or that learner's tutor.
pub(crate) async fn cycle_for_principal(
    cycles: &dyn CycleRepository,
    learners: &dyn LearnerRepository,
    principal: &Principal,
    cycle_id: &CycleId,
) -> Result<WeeklyCycle, DomainError> {
    match principal.role {
        Role::Tutor => {
            let tutor_id = principal.require_tutor()?;
            cycle_for_tutor(cycles, learners, &tutor_id, cycle_id).await
        }
        Role::Learner => {
            let learner_id = principal.require_learner()?;
            let cycle = load_cycle(cycles, cycle_id).await?;
            cycle.check_learner(&learner_id)?;
            Ok(cycle)
        }
    }
}
