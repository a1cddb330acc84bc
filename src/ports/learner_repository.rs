//! Learner repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LearnerId, TutorId};
use crate::domain::learner::Learner;

/// Repository port for learner profiles.
///
/// Lifetime points are never written through this port; see `PointsLedger`.
#[async_trait]
pub trait LearnerRepository: Send + Sync {
    /// Insert a new learner.
    ///
    /// Implementations re-check the per-tutor cap and PIN uniqueness
    /// atomically with the insert.
    ///
    /// # Errors
    ///
    /// - `MaxLearnersReached` if the tutor already has `max_per_tutor` learners
    /// - `PinAlreadyUsed` if another learner of the tutor has the same PIN
    /// - `DatabaseError` on persistence failure
    async fn create(&self, learner: &Learner, max_per_tutor: usize) -> Result<(), DomainError>;

    /// Find a learner by ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &LearnerId) -> Result<Option<Learner>, DomainError>;

    /// All learners of a tutor, oldest first.
    async fn list_by_tutor(&self, tutor_id: &TutorId) -> Result<Vec<Learner>, DomainError>;
}
