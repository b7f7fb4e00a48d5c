//! A single deployment attempt and its terminal outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of a deployment run. At most one run is `Running`
/// process-wide at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::TimedOut => "timed_out",
        }
    }
}

/// One execution of the deployment script, from trigger to terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRun {
    pub id: Uuid,
    /// What triggered the run, e.g. `refs/heads/main@abc12345 by alice`.
    pub trigger_ref: String,
    pub status: RunStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DeploymentRun {
    pub fn start(trigger_ref: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger_ref: trigger_ref.to_string(),
            status: RunStatus::Running,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self, status: RunStatus, exit_code: Option<i32>, stdout: String, stderr: String) {
        self.status = status;
        self.exit_code = exit_code;
        self.stdout = stdout;
        self.stderr = stderr;
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}
