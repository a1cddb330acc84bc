//! Learner aggregate.

use crate::domain::foundation::{LearnerId, OwnedByTutor, Timestamp, TutorId};

use super::{DisplayName, Pin};

/// Most learners one tutor may manage.
pub const MAX_LEARNERS_PER_TUTOR: usize = 4;

/// A child profile owned by a tutor.
///
/// `total_points` only ever grows, and only through the points ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Learner {
    pub id: LearnerId,
    pub tutor_id: TutorId,
    pub display_name: DisplayName,
    pub pin: Pin,
    pub total_points: i64,
    pub created_at: Timestamp,
}

impl Learner {
    pub fn new(tutor_id: TutorId, display_name: DisplayName, pin: Pin, now: Timestamp) -> Self {
        Self {
            id: LearnerId::new(),
            tutor_id,
            display_name,
            pin,
            total_points: 0,
            created_at: now,
        }
    }
}

impl OwnedByTutor for Learner {
    fn tutor_id(&self) -> &TutorId {
        &self.tutor_id
    }
}
