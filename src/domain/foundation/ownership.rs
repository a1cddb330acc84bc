//! Ownership traits for tutor- and learner-owned records.
//!
//! Ownership chains (completion → cycle → learner → tutor) are resolved by
//! id lookups in the handlers; these traits only answer "does this id own
//! this record" and produce a consistent `Forbidden` error.

use super::{DomainError, ErrorCode, LearnerId, TutorId};

/// Records owned directly by a tutor.
pub trait OwnedByTutor {
    fn tutor_id(&self) -> &TutorId;

    fn is_owned_by(&self, tutor_id: &TutorId) -> bool {
        self.tutor_id() == tutor_id
    }

    /// Validates ownership, returning `Forbidden` if the tutor is not the owner.
    fn check_tutor(&self, tutor_id: &TutorId) -> Result<(), DomainError> {
        if self.is_owned_by(tutor_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Tutor does not own this learner",
            )
            .with_detail("requested_by", tutor_id.to_string()))
        }
    }
}

/// Records that belong to a single learner.
pub trait OwnedByLearner {
    fn learner_id(&self) -> &LearnerId;

    /// Validates ownership, returning `Forbidden` if the learner differs.
    fn check_learner(&self, learner_id: &LearnerId) -> Result<(), DomainError> {
        if self.learner_id() == learner_id {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "This record belongs to another learner",
            )
            .with_detail("requested_by", learner_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owned {
        tutor: TutorId,
        learner: LearnerId,
    }

    impl OwnedByTutor for Owned {
        fn tutor_id(&self) -> &TutorId {
            &self.tutor
        }
    }

    impl OwnedByLearner for Owned {
        fn learner_id(&self) -> &LearnerId {
            &self.learner
        }
    }

    fn record() -> Owned {
        Owned {
            tutor: TutorId::new(),
            learner: LearnerId::new(),
        }
    }

    #[test]
    fn owner_passes_tutor_check() {
        let r = record();
        assert!(r.check_tutor(&r.tutor).is_ok());
    }

    #[test]
    fn stranger_fails_tutor_check_with_forbidden() {
        let err = record().check_tutor(&TutorId::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn other_learner_fails_learner_check() {
        let r = record();
        assert!(r.check_learner(&r.learner).is_ok());
        assert!(r.check_learner(&LearnerId::new()).is_err());
    }
}
