//! Dispatcher configuration — loaded from environment variables once at startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::models::health::HealthEndpoint;

/// Whether inbound webhook signatures are checked.
///
/// Running without a secret disables verification entirely. That is an
/// explicit operator choice (e.g. a firewalled internal deployment), not a
/// fallback, which is why it is modeled as its own state instead of an
/// empty-string secret.
#[derive(Clone, Debug)]
pub enum SignatureVerification {
    Enabled { secret: String },
    Disabled,
}

#[derive(Clone, Debug)]
pub struct OpsConfig {
    /// Signature verification mode for `X-Hub-Signature-256`.
    pub signature: SignatureVerification,
    /// Deployment repository root; working directory for the deploy script.
    pub repo_path: PathBuf,
    /// Path to the deployment script.
    pub deploy_script: PathBuf,
    /// Wall-clock ceiling for one deployment run.
    pub deploy_timeout: Duration,
    /// Git ref that triggers a deployment, e.g. `refs/heads/main`.
    pub branch_ref: String,
    /// Repository name that triggers a deployment.
    pub repo_name: String,
    /// Extra PATH entries prepended to the ambient PATH for the script.
    pub extra_path: Vec<String>,
    /// Endpoints probed after a successful deployment, in order.
    pub health_endpoints: Vec<HealthEndpoint>,
    /// Append-only audit log destination.
    pub audit_log_path: PathBuf,
}

impl OpsConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("OPS_WEBHOOK_SECRET").unwrap_or_default();
        let signature = if secret.is_empty() {
            tracing::warn!("OPS_WEBHOOK_SECRET not set -- webhook signature verification disabled");
            SignatureVerification::Disabled
        } else {
            SignatureVerification::Enabled { secret }
        };

        let repo_path = PathBuf::from(
            std::env::var("OPS_REPO_PATH").unwrap_or_else(|_| "/opt/brightbudget".to_string()),
        );
        let deploy_script = std::env::var("OPS_DEPLOY_SCRIPT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| repo_path.join("scripts/local_deploy.sh"));
        let deploy_timeout = std::env::var("OPS_DEPLOY_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300));
        let branch_ref =
            std::env::var("OPS_BRANCH_REF").unwrap_or_else(|_| "refs/heads/main".to_string());
        let repo_name =
            std::env::var("OPS_REPO_NAME").unwrap_or_else(|_| "brightbudget-backend".to_string());
        let extra_path = std::env::var("OPS_EXTRA_PATH")
            .unwrap_or_else(|_| "/usr/local/go/bin".to_string())
            .split(':')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        let health_endpoints = std::env::var("OPS_HEALTH_URLS")
            .unwrap_or_else(|_| {
                "https://api.brightbudget.app/health,https://api.brightbudget.app/signup/check-email"
                    .to_string()
            })
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(HealthEndpoint::from_url)
            .collect();
        let audit_log_path = std::env::var("OPS_AUDIT_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| repo_path.join("logs/webhook.log"));

        Self {
            signature,
            repo_path,
            deploy_script,
            deploy_timeout,
            branch_ref,
            repo_name,
            extra_path,
            health_endpoints,
            audit_log_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::health::ProbeMethod;

    #[test]
    fn health_url_list_parses_methods() {
        let endpoints: Vec<HealthEndpoint> =
            "https://api.brightbudget.app/health, https://api.brightbudget.app/signup/check-email"
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(HealthEndpoint::from_url)
                .collect();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].method, ProbeMethod::Get);
        assert_eq!(endpoints[1].method, ProbeMethod::Post);
    }
}
