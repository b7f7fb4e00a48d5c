//! Deployment executor — runs the deployment script as a bounded-lifetime
//! subprocess, captures its output, and serializes runs so at most one
//! deployment is in flight process-wide.

use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::config::OpsConfig;
use crate::models::run::{DeploymentRun, RunStatus};

/// Tail kept per captured stream.
const CAPTURE_LIMIT: usize = 65536;

/// Outcome of a trigger hitting the executor.
#[derive(Debug)]
pub enum ExecuteOutcome {
    /// The run went to completion (any terminal status).
    Completed(DeploymentRun),
    /// A deployment was already in flight; this trigger was not queued.
    Busy,
}

/// Owns the single deployment slot. The mutex is the concurrency invariant:
/// a second trigger can only ever observe `Busy`, never a second subprocess.
pub struct DeploymentExecutor {
    slot: Mutex<()>,
}

impl DeploymentExecutor {
    pub fn new() -> Self {
        Self { slot: Mutex::new(()) }
    }

    /// Run the deployment script unless a run is already in flight.
    /// Concurrent triggers are rejected, not queued.
    pub async fn try_execute(&self, config: &OpsConfig, trigger_ref: &str) -> ExecuteOutcome {
        let _slot = match self.slot.try_lock() {
            Ok(guard) => guard,
            Err(_) => return ExecuteOutcome::Busy,
        };

        ExecuteOutcome::Completed(run_script(config, trigger_ref).await)
    }
}

impl Default for DeploymentExecutor {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_script(config: &OpsConfig, trigger_ref: &str) -> DeploymentRun {
    let mut run = DeploymentRun::start(trigger_ref);

    tracing::info!(
        run_id = %run.id,
        script = %config.deploy_script.display(),
        trigger = trigger_ref,
        "Executing deployment script"
    );

    let spawned = Command::new(&config.deploy_script)
        .current_dir(&config.repo_path)
        .env("PATH", path_with_extras(&config.extra_path))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(run_id = %run.id, "Failed to spawn deployment script: {e}");
            run.finish(
                RunStatus::Failed,
                None,
                String::new(),
                format!("failed to spawn {}: {e}", config.deploy_script.display()),
            );
            return run;
        }
    };

    let waited = tokio::time::timeout(config.deploy_timeout, wait_with_capture(&mut child)).await;

    match waited {
        Ok(Ok((status, stdout, stderr))) => {
            let exit_code = status.code();
            let terminal = if status.success() {
                RunStatus::Succeeded
            } else {
                RunStatus::Failed
            };
            run.finish(terminal, exit_code, truncate_tail(stdout), truncate_tail(stderr));
            tracing::info!(
                run_id = %run.id,
                status = run.status.as_str(),
                exit_code = ?run.exit_code,
                duration_ms = ?run.duration_ms(),
                "Deployment script finished"
            );
        }
        Ok(Err(e)) => {
            tracing::error!(run_id = %run.id, "Failed to collect script output: {e}");
            run.finish(
                RunStatus::Failed,
                None,
                String::new(),
                format!("failed to collect script output: {e}"),
            );
        }
        Err(_) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            tracing::error!(
                run_id = %run.id,
                timeout_secs = config.deploy_timeout.as_secs(),
                "Deployment script timed out, process killed"
            );
            run.finish(RunStatus::TimedOut, None, String::new(), String::new());
        }
    }

    run
}

/// Wait for the child while draining both pipes to completion. Cancelling
/// this future (on timeout) drops the taken pipes, closing them.
async fn wait_with_capture(child: &mut Child) -> std::io::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let read_stdout = async {
        if let Some(pipe) = stdout_pipe.as_mut() {
            pipe.read_to_end(&mut stdout).await?;
        }
        Ok::<_, std::io::Error>(())
    };
    let read_stderr = async {
        if let Some(pipe) = stderr_pipe.as_mut() {
            pipe.read_to_end(&mut stderr).await?;
        }
        Ok::<_, std::io::Error>(())
    };

    let (status, _, _) = tokio::try_join!(child.wait(), read_stdout, read_stderr)?;
    Ok((status, stdout, stderr))
}

/// Ambient PATH with the configured extra entries prepended. Overrides are
/// additive; the ambient environment is never replaced.
fn path_with_extras(extras: &[String]) -> String {
    let ambient = std::env::var("PATH").unwrap_or_default();
    if extras.is_empty() {
        return ambient;
    }
    let mut path = extras.join(":");
    if !ambient.is_empty() {
        path.push(':');
        path.push_str(&ambient);
    }
    path
}

/// Keep the tail of a captured stream, bounded to 64 KiB per field.
fn truncate_tail(bytes: Vec<u8>) -> String {
    let text = String::from_utf8_lossy(&bytes).to_string();
    if text.len() <= CAPTURE_LIMIT {
        return text;
    }
    let mut cut = text.len() - CAPTURE_LIMIT;
    while !text.is_char_boundary(cut) {
        cut += 1;
    }
    format!("...truncated...\n{}", &text[cut..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_output_is_kept_verbatim() {
        let out = truncate_tail(b"all fine".to_vec());
        assert_eq!(out, "all fine");
    }

    #[test]
    fn long_output_keeps_the_tail() {
        let mut bytes = vec![b'a'; CAPTURE_LIMIT + 100];
        bytes.extend_from_slice(b"THE END");
        let out = truncate_tail(bytes);
        assert!(out.starts_with("...truncated...\n"));
        assert!(out.ends_with("THE END"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // multibyte content straddling the cut point must not panic
        let text = "€".repeat(CAPTURE_LIMIT / 3 + 1);
        let out = truncate_tail(text.into_bytes());
        assert!(out.starts_with("...truncated...\n"));
    }

    #[test]
    fn extra_path_entries_are_prepended() {
        let path = path_with_extras(&["/usr/local/go/bin".to_string()]);
        assert!(path.starts_with("/usr/local/go/bin"));
    }
}
