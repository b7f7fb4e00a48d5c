//! Error taxonomy for the webhook flow. Every variant maps to the HTTP
//! response contract; none of them terminates the listener.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Bad or missing signature. No deployment is attempted.
    #[error("Invalid signature")]
    AuthenticationFailure,

    /// Body could not be decoded as a JSON payload.
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Script exited non-zero or could not be spawned.
    #[error("Deployment failed")]
    DeploymentFailure,

    /// Script exceeded the wall-clock ceiling and was terminated.
    #[error("Deployment timed out after {0}s")]
    DeploymentTimeout(u64),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::AuthenticationFailure => StatusCode::UNAUTHORIZED,
            DispatchError::MalformedPayload(_)
            | DispatchError::DeploymentFailure
            | DispatchError::DeploymentTimeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            DispatchError::AuthenticationFailure => "authentication",
            DispatchError::MalformedPayload(_) => "malformed_payload",
            DispatchError::DeploymentFailure => "deployment_failure",
            DispatchError::DeploymentTimeout(_) => "deployment_timeout",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
