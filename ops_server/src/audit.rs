//! Append-only audit log — every decision point in the webhook flow writes
//! one timestamped line here, in addition to the structured tracing output.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Process-wide audit sink. Cloning is cheap; all clones append to the same
/// file. Safe to call from any point in the flow.
#[derive(Clone)]
pub struct AuditLog {
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
}

impl AuditLog {
    /// Open (or create) the audit log at `path`. A sink that cannot be
    /// opened degrades to tracing-only operation rather than failing boot.
    pub fn open(path: &Path) -> Self {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create audit log directory {}: {e}", parent.display());
            }
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(f),
            Err(e) => {
                tracing::warn!("Failed to open audit log {}: {e}", path.display());
                None
            }
        };

        Self {
            path: path.to_path_buf(),
            file: Arc::new(Mutex::new(file)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. Write failures are swallowed: the audit
    /// log must never take down a request.
    pub fn record(&self, message: &str) {
        let line = format!(
            "[{}] {}\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.write_all(line.as_bytes());
            }
        }
    }

    /// Last `n` lines of the audit file, for the `/logs` endpoint.
    pub fn tail(&self, n: usize) -> std::io::Result<String> {
        let content = std::fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().collect();
        let start = lines.len().saturating_sub(n);
        Ok(lines[start..].join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_tails_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/webhook.log");

        let audit = AuditLog::open(&path);
        for i in 0..60 {
            audit.record(&format!("line {i}"));
        }

        let tail = audit.tail(50).unwrap();
        let lines: Vec<&str> = tail.lines().collect();
        assert_eq!(lines.len(), 50);
        assert!(lines[0].ends_with("line 10"));
        assert!(lines[49].ends_with("line 59"));
    }

    #[test]
    fn clones_share_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");

        let audit = AuditLog::open(&path);
        let clone = audit.clone();
        audit.record("from original");
        clone.record("from clone");

        let tail = audit.tail(10).unwrap();
        assert!(tail.contains("from original"));
        assert!(tail.contains("from clone"));
    }
}
