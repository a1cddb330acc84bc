//! HTTP adapter - REST API over the application handlers.
//!
//! # Endpoints
//!
//! - `GET  /health`
//! - `POST /api/learners`, `GET /api/learners`
//! - `POST /api/weekly-cycles`, `GET /api/weekly-cycles/:id`
//! - `POST /api/weekly-cycles/:id/activate`, `POST /api/weekly-cycles/:id/complete`
//! - `GET  /api/weekly-cycles/:id/pending-completions`
//! - `POST /api/weekly-cycles/sweep`
//! - `POST /api/tasks`, `DELETE /api/tasks/:id`, `POST /api/tasks/complete`
//! - `PATCH /api/completions/:id`
//! - `GET  /api/learner/board`
//!
//! The principal is taken from `X-Principal-Id` / `X-Principal-Role`
//! headers set by the upstream gateway. Malformed JSON bodies are
//! rejected with the same error body as domain validation failures.

pub mod dto;
mod error;
mod extract;
pub mod handlers;
mod principal;
pub mod routes;
mod state;

pub use error::ApiError;
pub use extract::ApiJson;
pub use principal::{AuthenticatedPrincipal, PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER};
pub use routes::api_router;
pub use state::AppState;
