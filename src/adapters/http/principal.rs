//! Principal extraction from gateway headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Principal, Role};

use super::ApiError;

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

/// The authenticated caller, as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedPrincipal(pub Principal);

fn unauthorized(message: &str) -> ApiError {
    ApiError(DomainError::new(ErrorCode::Unauthorized, message))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id: Uuid = header(PRINCIPAL_ID_HEADER)
            .ok_or_else(|| unauthorized("Authentication is required"))?
            .parse()
            .map_err(|_| unauthorized("Principal id is not a valid UUID"))?;

        let role: Role = header(PRINCIPAL_ROLE_HEADER)
            .ok_or_else(|| unauthorized("Principal role is required"))?
            .parse()
            .map_err(|_| unauthorized("Principal role must be 'tutor' or 'learner'"))?;

        Ok(AuthenticatedPrincipal(Principal { id, role }))
    }
}
