//! Domain error to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind};

use super::dto::ErrorResponse;

/// API error wrapping a domain error.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        ApiError(DomainError::validation(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self.0.code {
            ErrorCode::ActiveCycleExists | ErrorCode::PinAlreadyUsed => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => match self.0.kind() {
                ErrorKind::Validation | ErrorKind::StateConflict | ErrorKind::LimitExceeded => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::Transient => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.0.code, error = %self.0.message, "request failed");
        } else {
            tracing::debug!(code = %self.0.code, error = %self.0.message, "request rejected");
        }

        // Storage messages carry driver text that callers should not see.
        let body = if status.is_server_error() {
            ErrorResponse {
                code: self.0.code.to_string(),
                message: "Something went wrong. Please try again.".to_string(),
                details: None,
            }
        } else {
            ErrorResponse::from(&self.0)
        };

        (status, Json(body)).into_response()
    }
}
