//! Webhook handler — authenticates the event, filters it, and drives the
//! deployment plus post-deployment verification.

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Serialize;

use crate::error::DispatchError;
use crate::models::event::PushEvent;
use crate::models::run::RunStatus;
use crate::routes::AppState;
use crate::services::executor::ExecuteOutcome;
use crate::services::{filter, signature};

/// Body of every non-error webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub message: String,
}

impl WebhookResponse {
    fn ignored(message: &str) -> (StatusCode, Json<WebhookResponse>) {
        (
            StatusCode::OK,
            Json(WebhookResponse {
                status: "ignored",
                message: message.to_string(),
            }),
        )
    }

    fn success(message: &str) -> (StatusCode, Json<WebhookResponse>) {
        (
            StatusCode::OK,
            Json(WebhookResponse {
                status: "success",
                message: message.to_string(),
            }),
        )
    }
}

/// Handle an incoming webhook payload end to end.
///
/// The response tracks only the deployment run's terminal status; the
/// health verdict is logged but deliberately does not change the outcome
/// already implied by a zero exit code.
pub async fn handle_webhook(
    state: &AppState,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>), DispatchError> {
    let config = &state.config;

    let signature_header = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok());

    if !signature::validate_signature(&config.signature, &body, signature_header) {
        tracing::warn!("Webhook signature validation failed");
        state.audit.record("Webhook rejected: invalid signature");
        crate::metrics::error_recorded("authentication");
        return Err(DispatchError::AuthenticationFailure);
    }

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!("Failed to parse webhook payload: {e}");
        state.audit.record(&format!("Webhook rejected: malformed payload: {e}"));
        crate::metrics::error_recorded("malformed_payload");
        DispatchError::MalformedPayload(e)
    })?;

    let event = PushEvent::from_value(&payload);

    if !filter::qualifies(&event, &config.branch_ref, &config.repo_name) {
        tracing::info!(
            git_ref = event.git_ref.as_deref().unwrap_or(""),
            repository = event.repository_name.as_deref().unwrap_or(""),
            "Ignoring non-qualifying event"
        );
        state.audit.record(&format!(
            "Ignored event: ref={} repository={}",
            event.git_ref.as_deref().unwrap_or("<missing>"),
            event.repository_name.as_deref().unwrap_or("<missing>"),
        ));
        return Ok(WebhookResponse::ignored("Not a main branch push"));
    }

    let trigger_ref = event.describe();
    tracing::info!(trigger = %trigger_ref, "Qualifying push received, starting deployment");
    state.audit.record(&format!("Deployment triggered by {trigger_ref}"));
    if let Some(message) = &event.commit_message {
        state.audit.record(&format!("Commit message: {message}"));
    }

    let run = match state.executor.try_execute(config, &trigger_ref).await {
        ExecuteOutcome::Busy => {
            tracing::warn!("Trigger ignored: a deployment is already in progress");
            state
                .audit
                .record("Ignored trigger: deployment already in progress");
            return Ok(WebhookResponse::ignored("Deployment already in progress"));
        }
        ExecuteOutcome::Completed(run) => run,
    };

    crate::metrics::deployment_finished(run.status.as_str());
    if let Some(duration) = run.duration_ms() {
        crate::metrics::deployment_duration(duration as u64);
    }

    state.audit.record(&format!(
        "Deployment {} finished: status={} exit_code={}",
        run.id,
        run.status.as_str(),
        run.exit_code.map_or("none".to_string(), |c| c.to_string()),
    ));
    if !run.stdout.is_empty() {
        state.audit.record(&format!("Deployment stdout: {}", run.stdout));
    }
    if !run.stderr.is_empty() {
        state.audit.record(&format!("Deployment stderr: {}", run.stderr));
    }

    match run.status {
        RunStatus::Succeeded => {
            let summary = state.verifier.check(&config.health_endpoints).await;
            crate::metrics::health_percentage(summary.percentage);

            for probe in &summary.probes {
                if probe.ok {
                    state
                        .audit
                        .record(&format!("Health probe OK: {} ({}ms)", probe.url, probe.latency_ms));
                } else {
                    state.audit.record(&format!(
                        "Health probe failed: {} - {}",
                        probe.url,
                        probe.reason.as_deref().unwrap_or("unknown"),
                    ));
                }
            }
            state.audit.record(&format!(
                "Post-deployment health: {}% ({}/{} OK) - {}",
                summary.percentage,
                summary.succeeded,
                summary.total,
                summary.verdict.as_str(),
            ));

            Ok(WebhookResponse::success("Deployment executed"))
        }
        RunStatus::TimedOut => {
            crate::metrics::error_recorded("deployment_timeout");
            state.audit.record(&format!(
                "Deployment timed out after {}s, no health verification attempted",
                config.deploy_timeout.as_secs(),
            ));
            Err(DispatchError::DeploymentTimeout(config.deploy_timeout.as_secs()))
        }
        _ => {
            crate::metrics::error_recorded("deployment_failure");
            Err(DispatchError::DeploymentFailure)
        }
    }
}
