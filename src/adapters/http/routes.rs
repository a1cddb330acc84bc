//! Route configuration.

use std::time::Duration;

use axum::http::{HeaderName, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    activate_cycle, add_task, complete_task, create_cycle, create_learner, delete_task,
    finalize_cycle, get_cycle, health, learner_board, list_learners, pending_completions,
    review_completion, sweep_cycles,
};
use super::{AppState, PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the API router with every endpoint and the shared middleware.
pub fn api_router(state: AppState, request_timeout: Duration) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(PRINCIPAL_ID_HEADER),
            HeaderName::from_static(PRINCIPAL_ROLE_HEADER),
        ]);

    Router::new()
        .route("/health", get(health))
        .route("/api/learners", post(create_learner).get(list_learners))
        .route("/api/learner/board", get(learner_board))
        .route("/api/weekly-cycles", post(create_cycle))
        .route("/api/weekly-cycles/sweep", post(sweep_cycles))
        .route("/api/weekly-cycles/:id", get(get_cycle))
        .route("/api/weekly-cycles/:id/activate", post(activate_cycle))
        .route("/api/weekly-cycles/:id/complete", post(finalize_cycle))
        .route(
            "/api/weekly-cycles/:id/pending-completions",
            get(pending_completions),
        )
        .route("/api/tasks", post(add_task))
        .route("/api/tasks/complete", post(complete_task))
        .route("/api/tasks/:id", axum::routing::delete(delete_task))
        .route("/api/completions/:id", patch(review_completion))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
