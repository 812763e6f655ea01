//! Route handlers: health, report queries, and the lifecycle actions.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dockcheck_core::{ReportId, Role};
use dockcheck_engine::{
    Actor, CreateReport, FieldReview, OfficeApproval, OfficeRejection, ResubmitReport,
};
use serde::Deserialize;

use super::state::AppState;
use super::{json_error, workflow_error};

/// Body of every mutating request: the acting party plus the action fields.
#[derive(Debug, Deserialize)]
pub(crate) struct ActionRequest<T> {
    actor: Actor,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    role: Option<String>,
}

/// Unwrap a JSON body, turning extractor failures into JSON errors.
fn body<T>(
    parsed: Result<Json<ActionRequest<T>>, JsonRejection>,
) -> Result<ActionRequest<T>, Response> {
    parsed
        .map(|Json(request)| request)
        .map_err(|rejection| json_error(StatusCode::BAD_REQUEST, &rejection.body_text()))
}

fn parse_role(raw: &str) -> Result<Role, Response> {
    Role::from_str(raw).map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            &format!("unknown role '{raw}' (expected driver, field or office)"),
        )
    })
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /reports
pub(crate) async fn handle_list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let role = match query.role.as_deref().map(parse_role).transpose() {
        Ok(role) => role,
        Err(response) => return response,
    };
    match state.service.list(role).await {
        Ok(reports) => {
            (StatusCode::OK, Json(serde_json::json!({ "reports": reports }))).into_response()
        }
        Err(e) => workflow_error(e),
    }
}

/// POST /reports
pub(crate) async fn handle_create(
    State(state): State<Arc<AppState>>,
    parsed: Result<Json<ActionRequest<CreateReport>>, JsonRejection>,
) -> Response {
    let request = match body(parsed) {
        Ok(r) => r,
        Err(response) => return response,
    };
    match state.service.create(request.actor, &request.payload).await {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(e) => workflow_error(e),
    }
}

/// GET /reports/{id}
pub(crate) async fn handle_get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.service.get(&ReportId::new(id)).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => workflow_error(e),
    }
}

/// POST /reports/{id}/resubmit
pub(crate) async fn handle_resubmit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    parsed: Result<Json<ActionRequest<ResubmitReport>>, JsonRejection>,
) -> Response {
    let request = match body(parsed) {
        Ok(r) => r,
        Err(response) => return response,
    };
    let result = state
        .service
        .resubmit(&ReportId::new(id), request.actor, &request.payload)
        .await;
    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => workflow_error(e),
    }
}

/// POST /reports/{id}/field-review
pub(crate) async fn handle_field_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    parsed: Result<Json<ActionRequest<FieldReview>>, JsonRejection>,
) -> Response {
    let request = match body(parsed) {
        Ok(r) => r,
        Err(response) => return response,
    };
    let result = state
        .service
        .field_review(&ReportId::new(id), request.actor, &request.payload)
        .await;
    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => workflow_error(e),
    }
}

/// POST /reports/{id}/office-approve
pub(crate) async fn handle_office_approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    parsed: Result<Json<ActionRequest<OfficeApproval>>, JsonRejection>,
) -> Response {
    let request = match body(parsed) {
        Ok(r) => r,
        Err(response) => return response,
    };
    let result = state
        .service
        .office_approve(&ReportId::new(id), request.actor, &request.payload)
        .await;
    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => workflow_error(e),
    }
}

/// POST /reports/{id}/office-reject
pub(crate) async fn handle_office_reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    parsed: Result<Json<ActionRequest<OfficeRejection>>, JsonRejection>,
) -> Response {
    let request = match body(parsed) {
        Ok(r) => r,
        Err(response) => return response,
    };
    let result = state
        .service
        .office_reject(&ReportId::new(id), request.actor, &request.payload)
        .await;
    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => workflow_error(e),
    }
}

/// GET /reports/{id}/certificate
pub(crate) async fn handle_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.service.certificate(&ReportId::new(id)).await {
        Ok(certificate) => (StatusCode::OK, Json(certificate)).into_response(),
        Err(e) => workflow_error(e),
    }
}

/// GET /reports/{id}/transitions?role=...
pub(crate) async fn handle_transitions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let Some(raw) = query.role.as_deref() else {
        return json_error(StatusCode::BAD_REQUEST, "missing query parameter 'role'");
    };
    let role = match parse_role(raw) {
        Ok(role) => role,
        Err(response) => return response,
    };
    match state.service.transitions(&ReportId::new(id), role).await {
        Ok(transitions) => (
            StatusCode::OK,
            Json(serde_json::json!({ "role": role, "transitions": transitions })),
        )
            .into_response(),
        Err(e) => workflow_error(e),
    }
}

/// GET /reports/{id}/signatures/{role}
pub(crate) async fn handle_last_signature(
    State(state): State<Arc<AppState>>,
    Path((id, role)): Path<(String, String)>,
) -> Response {
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    match state.service.last_signature(&ReportId::new(id), role).await {
        Ok(signature) => (
            StatusCode::OK,
            Json(serde_json::json!({ "role": role, "signature": signature })),
        )
            .into_response(),
        Err(e) => workflow_error(e),
    }
}
