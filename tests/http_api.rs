//! HTTP tests for the API router.
//!
//! Requests go through the full middleware stack against the in-memory
//! store, with identity carried in the principal headers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use board_master::adapters::http::{
    api_router, AppState, PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER,
};
use board_master::adapters::{InMemoryStore, ManualClock};
use board_master::domain::foundation::LocalCalendar;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Api {
    router: Router,
    tutor: Uuid,
}

#[derive(Clone, Copy)]
enum As<'a> {
    Anonymous,
    Tutor(&'a Uuid),
    Learner(&'a str),
}

impl Api {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::at_rfc3339("2024-01-15T08:00:00Z").unwrap());
        let state = AppState::from_store(store, clock, LocalCalendar::utc());
        Self {
            router: api_router(state, Duration::from_secs(5)),
            tutor: Uuid::new_v4(),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        who: As<'_>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        builder = match who {
            As::Anonymous => builder,
            As::Tutor(id) => builder
                .header(PRINCIPAL_ID_HEADER, id.to_string())
                .header(PRINCIPAL_ROLE_HEADER, "tutor"),
            As::Learner(id) => builder
                .header(PRINCIPAL_ID_HEADER, id)
                .header(PRINCIPAL_ROLE_HEADER, "learner"),
        };
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn tutor(&self) -> As<'_> {
        As::Tutor(&self.tutor)
    }

    async fn create_learner(&self, pin: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/learners",
                self.tutor(),
                Some(json!({ "display_name": "Ava", "pin": pin })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_cycle(&self, learner_id: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/weekly-cycles",
                self.tutor(),
                Some(json!({
                    "learner_id": learner_id,
                    "start_date": "2024-01-15",
                    "end_date": "2024-01-21",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "draft");
        body["id"].as_str().unwrap().to_string()
    }

    async fn add_task(&self, cycle_id: &str, title: &str, freq: i32, boss: bool) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/tasks",
                self.tutor(),
                Some(json!({
                    "cycle_id": cycle_id,
                    "title": title,
                    "frequency_per_week": freq,
                    "is_boss_task": boss,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_needs_no_principal() {
    let api = Api::new();
    let (status, body) = api.send("GET", "/health", As::Anonymous, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_principal_is_unauthorized() {
    let api = Api::new();
    let (status, body) = api.send("GET", "/api/learners", As::Anonymous, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn tutor_sets_up_a_week_and_learner_completes_a_task() {
    let api = Api::new();
    let learner_id = api.create_learner("1234").await;
    let cycle_id = api.create_cycle(&learner_id).await;
    let task_id = api.add_task(&cycle_id, "Read 20 minutes", 3, false).await;

    let (status, body) = api
        .send(
            "POST",
            &format!("/api/weekly-cycles/{}/activate", cycle_id),
            api.tutor(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, body) = api
        .send(
            "POST",
            "/api/tasks/complete",
            As::Learner(&learner_id),
            Some(json!({ "task_id": task_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["completion"]["points_awarded"], 10);
    assert_eq!(body["completion"]["tutor_approved"], Value::Null);
    assert_eq!(body["progress"]["total_completed"], 1);
    assert_eq!(body["progress"]["total_needed"], 3);
    assert_eq!(body["just_unlocked_boss"], false);
    assert_eq!(body["week_points"], 10);

    let (status, body) = api
        .send("GET", "/api/learner/board", As::Learner(&learner_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_cycle"]["cycle"]["id"], cycle_id.as_str());
    assert_eq!(body["active_cycle"]["tasks"][0]["completed_today"], true);
    assert_eq!(body["review_cycle"], Value::Null);

    let (status, body) = api
        .send(
            "GET",
            &format!("/api/weekly-cycles/{}/pending-completions", cycle_id),
            api.tutor(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_pin_is_a_conflict() {
    let api = Api::new();
    api.create_learner("4321").await;

    let (status, body) = api
        .send(
            "POST",
            "/api/learners",
            api.tutor(),
            Some(json!({ "display_name": "Ben", "pin": "4321" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PIN_ALREADY_USED");
}

#[tokio::test]
async fn locked_boss_task_reports_remaining_count() {
    let api = Api::new();
    let learner_id = api.create_learner("1111").await;
    let cycle_id = api.create_cycle(&learner_id).await;
    api.add_task(&cycle_id, "Homework", 5, false).await;
    let boss_id = api.add_task(&cycle_id, "Build a fort", 1, true).await;
    api.send(
        "POST",
        &format!("/api/weekly-cycles/{}/activate", cycle_id),
        api.tutor(),
        None,
    )
    .await;

    let (status, body) = api
        .send(
            "POST",
            "/api/tasks/complete",
            As::Learner(&learner_id),
            Some(json!({ "task_id": boss_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BOSS_LOCKED");
    assert_eq!(body["details"]["tasks_remaining"], "4");
    assert_eq!(body["details"]["is_locked"], "true");
}

#[tokio::test]
async fn learner_cannot_use_tutor_routes() {
    let api = Api::new();
    let learner_id = api.create_learner("2222").await;

    let (status, body) = api
        .send("POST", "/api/weekly-cycles/sweep", As::Learner(&learner_id), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn malformed_path_id_is_a_bad_request() {
    let api = Api::new();
    let (status, _) = api
        .send("GET", "/api/weekly-cycles/not-a-uuid", api.tutor(), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let api = Api::new();
    let (status, body) = api
        .send(
            "POST",
            "/api/learners",
            api.tutor(),
            Some(json!({ "display_name": "Ava", "pin": 1234 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["field"], "body");
    assert!(body["message"].as_str().unwrap().contains("pin"));
}

#[tokio::test]
async fn tutor_dashboard_shows_each_learners_current_week() {
    let api = Api::new();
    let learner_id = api.create_learner("3333").await;
    let cycle_id = api.create_cycle(&learner_id).await;
    let task_id = api.add_task(&cycle_id, "Practice piano", 4, false).await;

    let (_, body) = api.send("GET", "/api/learners", api.tutor(), None).await;
    assert_eq!(body[0]["current_cycle"], Value::Null);
    assert_eq!(body[0]["draft_cycle"]["id"], cycle_id.as_str());

    api.send(
        "POST",
        &format!("/api/weekly-cycles/{}/activate", cycle_id),
        api.tutor(),
        None,
    )
    .await;
    api.send(
        "POST",
        "/api/tasks/complete",
        As::Learner(&learner_id),
        Some(json!({ "task_id": task_id })),
    )
    .await;

    let (status, body) = api.send("GET", "/api/learners", api.tutor(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], learner_id.as_str());
    assert_eq!(body[0]["display_name"], "Ava");
    assert_eq!(body[0]["draft_cycle"], Value::Null);

    let current = &body[0]["current_cycle"];
    assert_eq!(current["id"], cycle_id.as_str());
    assert_eq!(current["status"], "active");
    assert_eq!(current["pending_review"], 1);
    assert_eq!(current["week_points"], 10);
    assert_eq!(current["progress"]["total_completed"], 1);
    assert_eq!(current["progress"]["total_needed"], 4);
}
