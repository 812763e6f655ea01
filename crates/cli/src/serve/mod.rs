//! `dockcheck serve` -- HTTP JSON API for the report workflow.
//!
//! Endpoints:
//! - GET  /health                              - Server status
//! - GET  /reports[?role=driver|field|office]  - All reports, or one role's queue
//! - POST /reports                             - Driver submits a new report
//! - GET  /reports/{id}                        - One report with its history
//! - POST /reports/{id}/resubmit               - Driver resubmits a rejected report
//! - POST /reports/{id}/field-review           - Field inspector approves or rejects
//! - POST /reports/{id}/office-approve         - Office final approval
//! - POST /reports/{id}/office-reject          - Office sends the report back
//! - GET  /reports/{id}/certificate            - Certificate data
//! - GET  /reports/{id}/signatures/{role}      - Latest signature left by a role
//! - GET  /reports/{id}/transitions?role=...   - Actions a role may take now
//!
//! Mutating requests carry the acting party as `"actor": {"name", "role"}`
//! next to the action's own fields. All responses use
//! Content-Type: application/json.

mod handlers;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dockcheck_engine::EngineError;
use dockcheck_storage::InMemoryStorage;
use tower_http::cors::{Any, CorsLayer};

use self::handlers::{
    handle_certificate, handle_create, handle_field_review, handle_get_report, handle_health,
    handle_last_signature, handle_list_reports, handle_not_found, handle_office_approve,
    handle_office_reject, handle_resubmit, handle_transitions,
};
use self::state::AppState;
use crate::config::ServerConfig;
use crate::workflow::{ReportService, WorkflowError};

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

/// Map a workflow error to its HTTP status and JSON body.
fn workflow_error(err: WorkflowError) -> Response {
    let message = err.to_string();
    match err {
        WorkflowError::NotFound(_) => json_error(StatusCode::NOT_FOUND, &message),
        WorkflowError::Engine(EngineError::Validation(fields)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"error": message, "fields": fields})),
        )
            .into_response(),
        WorkflowError::Engine(EngineError::IllegalTransition { current, .. }) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": message, "currentStatus": current})),
        )
            .into_response(),
        WorkflowError::Engine(EngineError::RoleNotPermitted { .. }) => {
            json_error(StatusCode::FORBIDDEN, &message)
        }
        WorkflowError::Engine(EngineError::Backdated { .. }) => {
            json_error(StatusCode::CONFLICT, &message)
        }
        WorkflowError::ConflictOnWrite { .. } => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": message, "retryable": true})),
        )
            .into_response(),
        WorkflowError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
    }
}

/// Build the API router over `service`.
pub(crate) fn router(service: ReportService, max_body_bytes: usize) -> Router {
    let state = Arc::new(AppState { service });

    // CORS: permissive; the API sits behind the operator's own front end.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/reports", get(handle_list_reports).post(handle_create))
        .route("/reports/{id}", get(handle_get_report))
        .route("/reports/{id}/resubmit", post(handle_resubmit))
        .route("/reports/{id}/field-review", post(handle_field_review))
        .route("/reports/{id}/office-approve", post(handle_office_approve))
        .route("/reports/{id}/office-reject", post(handle_office_reject))
        .route("/reports/{id}/certificate", get(handle_certificate))
        .route("/reports/{id}/signatures/{role}", get(handle_last_signature))
        .route("/reports/{id}/transitions", get(handle_transitions))
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Start the HTTP server with an in-memory report store.
///
/// When TLS cert/key paths are provided, the server listens over HTTPS
/// using `axum-server` with rustls. Otherwise it uses plain HTTP.
pub(crate) async fn start_server(
    config: &ServerConfig,
    _tls_cert: Option<PathBuf>,
    _tls_key: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = ReportService::new(Arc::new(InMemoryStorage::new()), config.max_write_retries);
    let app = router(service, config.max_body_bytes);

    let addr = format!("0.0.0.0:{}", config.port);

    // TLS support via axum-server + rustls (requires `tls` feature)
    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) = (&_tls_cert, &_tls_key) {
        let tls =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;
        let socket_addr: std::net::SocketAddr = addr.parse()?;
        tracing::info!(%socket_addr, "dockcheck listening on https");
        axum_server::bind_rustls(socket_addr, tls)
            .serve(app.into_make_service())
            .await?;
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        max_write_retries = config.max_write_retries,
        "dockcheck listening on http"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("received shutdown signal");
}
