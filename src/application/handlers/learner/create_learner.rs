//! CreateLearnerHandler - Command handler for adding a learner profile.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode};
use crate::domain::learner::{DisplayName, Learner, Pin, MAX_LEARNERS_PER_TUTOR};
use crate::ports::{Clock, LearnerRepository};

/// Command to create a learner.
#[derive(Debug, Clone)]
pub struct CreateLearnerCommand {
    pub display_name: String,
    pub pin: String,
}

/// Handler for creating learners.
pub struct CreateLearnerHandler {
    learners: Arc<dyn LearnerRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateLearnerHandler {
    pub fn new(learners: Arc<dyn LearnerRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { learners, clock }
    }

    pub async fn handle(
        &self,
        cmd: CreateLearnerCommand,
        metadata: CommandMetadata,
    ) -> Result<Learner, DomainError> {
        let tutor_id = metadata.principal.require_tutor()?;
        let display_name = DisplayName::new(&cmd.display_name)?;
        let pin = Pin::new(&cmd.pin)?;

        let existing = self.learners.list_by_tutor(&tutor_id).await?;
        if existing.len() >= MAX_LEARNERS_PER_TUTOR {
            debug!(tutor_id = %tutor_id, "learner cap reached");
            return Err(DomainError::new(
                ErrorCode::MaxLearnersReached,
                format!("A tutor can have at most {} learners", MAX_LEARNERS_PER_TUTOR),
            ));
        }
        if existing.iter().any(|l| l.pin == pin) {
            return Err(DomainError::new(
                ErrorCode::PinAlreadyUsed,
                "Another learner already uses this PIN",
            ));
        }

        let learner = Learner::new(tutor_id, display_name, pin, self.clock.now());
        self.learners.create(&learner, MAX_LEARNERS_PER_TUTOR).await?;

        info!(
            tutor_id = %tutor_id,
            learner_id = %learner.id,
            correlation_id = %metadata.correlation_id(),
            "learner created"
        );
        Ok(learner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::{ErrorKind, LearnerId, Principal, TutorId};

    fn handler() -> (CreateLearnerHandler, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::at_rfc3339("2024-01-15T09:00:00Z").unwrap());
        (CreateLearnerHandler::new(store.clone(), clock), store)
    }

    fn cmd(name: &str, pin: &str) -> CreateLearnerCommand {
        CreateLearnerCommand {
            display_name: name.to_string(),
            pin: pin.to_string(),
        }
    }

    #[tokio::test]
    async fn creates_learner_with_zero_points() {
        let (handler, store) = handler();
        let tutor = TutorId::new();
        let learner = handler
            .handle(cmd(" Ava ", "1234"), CommandMetadata::new(Principal::tutor(tutor)))
            .await
            .unwrap();

        assert_eq!(learner.display_name.as_str(), "Ava");
        assert_eq!(learner.total_points, 0);
        assert_eq!(store.list_by_tutor(&tutor).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fifth_learner_is_rejected() {
        let (handler, _) = handler();
        let meta = CommandMetadata::new(Principal::tutor(TutorId::new()));
        for (i, pin) in ["1111", "2222", "3333", "4444"].iter().enumerate() {
            handler
                .handle(cmd(&format!("Kid {}", i), pin), meta.clone())
                .await
                .unwrap();
        }
        let err = handler.handle(cmd("Kid 5", "5555"), meta).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MaxLearnersReached);
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[tokio::test]
    async fn duplicate_pin_for_same_tutor_is_rejected() {
        let (handler, _) = handler();
        let meta = CommandMetadata::new(Principal::tutor(TutorId::new()));
        handler.handle(cmd("Ava", "1234"), meta.clone()).await.unwrap();
        let err = handler.handle(cmd("Ben", "1234"), meta).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PinAlreadyUsed);
    }

    #[tokio::test]
    async fn same_pin_for_different_tutors_is_allowed() {
        let (handler, _) = handler();
        for _ in 0..2 {
            let meta = CommandMetadata::new(Principal::tutor(TutorId::new()));
            handler.handle(cmd("Ava", "1234"), meta).await.unwrap();
        }
    }

    #[tokio::test]
    async fn invalid_pin_is_validation_error() {
        let (handler, _) = handler();
        let meta = CommandMetadata::new(Principal::tutor(TutorId::new()));
        let err = handler.handle(cmd("Ava", "12a4"), meta).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn learner_principal_cannot_create_learners() {
        let (handler, _) = handler();
        let meta = CommandMetadata::new(Principal::learner(LearnerId::new()));
        let err = handler.handle(cmd("Ava", "1234"), meta).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
