//! HTTP surface — liveness check, webhook trigger, recent audit log.

pub mod webhook;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::audit::AuditLog;
use crate::config::OpsConfig;
use crate::services::executor::DeploymentExecutor;
use crate::services::health::HealthVerifier;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OpsConfig>,
    pub executor: Arc<DeploymentExecutor>,
    pub verifier: Arc<HealthVerifier>,
    pub audit: AuditLog,
}

/// Build the dispatcher's Axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(liveness_handler))
        .route("/webhook", post(webhook_handler))
        .route("/logs", get(logs_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Liveness ──

async fn liveness_handler() -> &'static str {
    "BrightBudget ops server is running\n"
}

// ── Webhook ──

async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    crate::metrics::webhook_received();

    webhook::handle_webhook(&state, &headers, body).await
}

// ── Recent audit log ──

async fn logs_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state.audit.tail(50).map_err(|e| {
        tracing::error!("Failed to read audit log: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
