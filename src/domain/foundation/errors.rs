//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the offending field name.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Broad category an error falls into.
///
/// Callers use the kind to decide whether a retry can ever help: only
/// `Transient` failures may be retried without changing input or state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input, rejected before any read.
    Validation,
    /// Referenced entity is absent.
    NotFound,
    /// Principal is missing, has the wrong role, or does not own the entity.
    Forbidden,
    /// Operation is invalid for the current lifecycle state.
    StateConflict,
    /// Quota, cap or frequency violation.
    LimitExceeded,
    /// Storage-layer failure; the whole operation is safe to retry.
    Transient,
}

impl ErrorKind {
    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,
    InvalidDay,
    CycleLengthMismatch,

    // Not found errors
    LearnerNotFound,
    CycleNotFound,
    TaskNotFound,
    CompletionNotFound,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // State errors
    InvalidStateTransition,
    AlreadyActive,
    ActiveCycleExists,
    NoTasks,
    CycleLocked,
    HasCompletions,
    NoActiveCycle,
    CycleEnded,
    BossLocked,
    AlreadyReviewed,
    PinAlreadyUsed,

    // Limit errors
    MaxTasksReached,
    MaxBossTasksReached,
    MaxLearnersReached,
    FrequencyExceeded,
    AlreadyCompletedToday,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// Maps the code onto the error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            ValidationFailed | EmptyField | OutOfRange | InvalidFormat | InvalidDay
            | CycleLengthMismatch => ErrorKind::Validation,
            LearnerNotFound | CycleNotFound | TaskNotFound | CompletionNotFound => {
                ErrorKind::NotFound
            }
            Unauthorized | Forbidden => ErrorKind::Forbidden,
            InvalidStateTransition | AlreadyActive | ActiveCycleExists | NoTasks | CycleLocked
            | HasCompletions | NoActiveCycle | CycleEnded | BossLocked | AlreadyReviewed
            | PinAlreadyUsed => ErrorKind::StateConflict,
            MaxTasksReached | MaxBossTasksReached | MaxLearnersReached | FrequencyExceeded
            | AlreadyCompletedToday => ErrorKind::LimitExceeded,
            DatabaseError | InternalError => ErrorKind::Transient,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::InvalidDay => "INVALID_DAY",
            ErrorCode::CycleLengthMismatch => "CYCLE_LENGTH_MISMATCH",
            ErrorCode::LearnerNotFound => "LEARNER_NOT_FOUND",
            ErrorCode::CycleNotFound => "CYCLE_NOT_FOUND",
            ErrorCode::TaskNotFound => "TASK_NOT_FOUND",
            ErrorCode::CompletionNotFound => "COMPLETION_NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::AlreadyActive => "ALREADY_ACTIVE",
            ErrorCode::ActiveCycleExists => "ACTIVE_CYCLE_EXISTS",
            ErrorCode::NoTasks => "NO_TASKS",
            ErrorCode::CycleLocked => "CYCLE_LOCKED",
            ErrorCode::HasCompletions => "HAS_COMPLETIONS",
            ErrorCode::NoActiveCycle => "NO_ACTIVE_CYCLE",
            ErrorCode::CycleEnded => "CYCLE_ENDED",
            ErrorCode::BossLocked => "BOSS_LOCKED",
            ErrorCode::AlreadyReviewed => "ALREADY_REVIEWED",
            ErrorCode::PinAlreadyUsed => "PIN_ALREADY_USED",
            ErrorCode::MaxTasksReached => "MAX_TASKS_REACHED",
            ErrorCode::MaxBossTasksReached => "MAX_BOSS_TASKS_REACHED",
            ErrorCode::MaxLearnersReached => "MAX_LEARNERS_REACHED",
            ErrorCode::FrequencyExceeded => "FREQUENCY_EXCEEDED",
            ErrorCode::AlreadyCompletedToday => "ALREADY_COMPLETED_TODAY",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates a storage failure error.
    pub fn database(context: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns a detail value by key.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        let field = err.field().to_string();
        DomainError::new(code, err.to_string()).with_detail("field", field)
    }
}
