//! The acting identity behind every command.
//!
//! Authentication happens upstream; the engine only receives an already
//! verified identity together with its role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{DomainError, ErrorCode, LearnerId, TutorId, ValidationError};

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tutor,
    Learner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Tutor => write!(f, "tutor"),
            Role::Learner => write!(f, "learner"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tutor" => Ok(Role::Tutor),
            "learner" => Ok(Role::Learner),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("expected 'tutor' or 'learner', got '{}'", other),
            )),
        }
    }
}

/// Authenticated identity with its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn tutor(id: TutorId) -> Self {
        Self {
            id: *id.as_uuid(),
            role: Role::Tutor,
        }
    }

    pub fn learner(id: LearnerId) -> Self {
        Self {
            id: *id.as_uuid(),
            role: Role::Learner,
        }
    }

    /// Returns the tutor id, or `Forbidden` for any other role.
    pub fn require_tutor(&self) -> Result<TutorId, DomainError> {
        match self.role {
            Role::Tutor => Ok(TutorId::from_uuid(self.id)),
            Role::Learner => Err(wrong_role(Role::Tutor, self.role)),
        }
    }

    /// Returns the learner id, or `Forbidden` for any other role.
    pub fn require_learner(&self) -> Result<LearnerId, DomainError> {
        match self.role {
            Role::Learner => Ok(LearnerId::from_uuid(self.id)),
            Role::Tutor => Err(wrong_role(Role::Learner, self.role)),
        }
    }
}

fn wrong_role(expected: Role, actual: Role) -> DomainError {
    DomainError::new(
        ErrorCode::Forbidden,
        format!("This action requires the {} role", expected),
    )
    .with_detail("role", actual.to_string())
}
