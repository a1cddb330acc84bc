//! HTTP handlers connecting axum routes to application handlers.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::{
    ActivateCycleCommand, AddTaskCommand, CreateCycleCommand, CreateLearnerCommand,
    DeleteTaskCommand, FinalizeCycleCommand, GetCycleOverviewQuery, ListPendingCompletionsQuery,
    RecordCompletionCommand, ReviewCompletionCommand,
};
use crate::domain::foundation::{CommandMetadata, CompletionId, CycleId, TaskId};

use super::dto::{
    AddTaskRequest, CompleteTaskRequest, CreateCycleRequest, CreateLearnerRequest,
    CycleOverviewResponse, CycleResponse, FinalizeCycleResponse, HealthResponse,
    LearnerBoardResponse, LearnerResponse, LearnerSummaryResponse, PendingCompletionResponse,
    RecordCompletionResponse, ReviewCompletionRequest, ReviewCompletionResponse, SweepResponse,
};
use super::{ApiError, ApiJson, AppState, AuthenticatedPrincipal};

fn metadata(principal: AuthenticatedPrincipal) -> CommandMetadata {
    CommandMetadata::new(principal.0).with_source("http")
}

fn parse_id<T: From<Uuid>>(raw: &str, field: &str) -> Result<T, ApiError> {
    Uuid::parse_str(raw)
        .map(T::from)
        .map_err(|_| ApiError::bad_request(field, format!("Invalid {} format", field)))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Learners
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/learners
pub async fn create_learner(
    State(state): State<AppState>,
    principal: AuthenticatedPrincipal,
    ApiJson(request): ApiJson<CreateLearnerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateLearnerCommand {
        display_name: request.display_name,
        pin: request.pin,
    };
    let learner = state
        .create_learner_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok((StatusCode::CREATED, Json(LearnerResponse::from(learner))))
}

/// GET /api/learners
pub async fn list_learners(
    State(state): State<AppState>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let learners = state
        .list_learners_handler()
        .handle(metadata(principal))
        .await?;

    Ok(Json(
        learners
            .into_iter()
            .map(LearnerSummaryResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /api/learner/board
pub async fn learner_board(
    State(state): State<AppState>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let board = state
        .learner_board_handler()
        .handle(metadata(principal))
        .await?;

    Ok(Json(LearnerBoardResponse::from(board)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Weekly cycles
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/weekly-cycles
pub async fn create_cycle(
    State(state): State<AppState>,
    principal: AuthenticatedPrincipal,
    ApiJson(request): ApiJson<CreateCycleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateCycleCommand {
        learner_id: request.learner_id,
        start_date: request.start_date,
        end_date: request.end_date,
    };
    let cycle = state
        .create_cycle_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok((StatusCode::CREATED, Json(CycleResponse::from(cycle))))
}

/// GET /api/weekly-cycles/:id
pub async fn get_cycle(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetCycleOverviewQuery {
        cycle_id: parse_id::<CycleId>(&cycle_id, "cycle_id")?,
    };
    let overview = state
        .cycle_overview_handler()
        .handle(query, metadata(principal))
        .await?;

    Ok(Json(CycleOverviewResponse::from(overview)))
}

/// POST /api/weekly-cycles/:id/activate
pub async fn activate_cycle(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ActivateCycleCommand {
        cycle_id: parse_id::<CycleId>(&cycle_id, "cycle_id")?,
    };
    let cycle = state
        .activate_cycle_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok(Json(CycleResponse::from(cycle)))
}

/// POST /api/weekly-cycles/:id/complete
pub async fn finalize_cycle(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = FinalizeCycleCommand {
        cycle_id: parse_id::<CycleId>(&cycle_id, "cycle_id")?,
    };
    let result = state
        .finalize_cycle_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok(Json(FinalizeCycleResponse::from(result)))
}

/// GET /api/weekly-cycles/:id/pending-completions
pub async fn pending_completions(
    State(state): State<AppState>,
    Path(cycle_id): Path<String>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListPendingCompletionsQuery {
        cycle_id: parse_id::<CycleId>(&cycle_id, "cycle_id")?,
    };
    let pending = state
        .pending_completions_handler()
        .handle(query, metadata(principal))
        .await?;

    Ok(Json(
        pending
            .into_iter()
            .map(PendingCompletionResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/weekly-cycles/sweep
pub async fn sweep_cycles(
    State(state): State<AppState>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    principal.0.require_tutor()?;
    let moved = state.sweeper().sweep().await?;

    Ok(Json(SweepResponse {
        moved_to_review: moved,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Tasks and completions
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/tasks
pub async fn add_task(
    State(state): State<AppState>,
    principal: AuthenticatedPrincipal,
    ApiJson(request): ApiJson<AddTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = AddTaskCommand {
        cycle_id: request.cycle_id,
        title: request.title,
        description: request.description,
        icon: request.icon,
        expectation: request.expectation,
        frequency_per_week: request.frequency_per_week,
        is_boss_task: request.is_boss_task,
    };
    let task = state
        .add_task_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    principal: AuthenticatedPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteTaskCommand {
        task_id: parse_id::<TaskId>(&task_id, "task_id")?,
    };
    state
        .delete_task_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/complete
pub async fn complete_task(
    State(state): State<AppState>,
    principal: AuthenticatedPrincipal,
    ApiJson(request): ApiJson<CompleteTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = RecordCompletionCommand {
        task_id: request.task_id,
    };
    let result = state
        .record_completion_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok((StatusCode::CREATED, Json(RecordCompletionResponse::from(result))))
}

/// PATCH /api/completions/:id
pub async fn review_completion(
    State(state): State<AppState>,
    Path(completion_id): Path<String>,
    principal: AuthenticatedPrincipal,
    ApiJson(request): ApiJson<ReviewCompletionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ReviewCompletionCommand {
        completion_id: parse_id::<CompletionId>(&completion_id, "completion_id")?,
        approved: request.approved,
    };
    let result = state
        .review_completion_handler()
        .handle(cmd, metadata(principal))
        .await?;

    Ok(Json(ReviewCompletionResponse::from(result)))
}
