//! Decoded push event — only the fields the dispatcher inspects.

/// Fields extracted from a GitHub push payload. Every field is optional:
/// a missing field never fails decoding, it just won't match the filter.
#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    pub git_ref: Option<String>,
    pub repository_name: Option<String>,
    pub pusher: Option<String>,
    pub commit_sha: Option<String>,
    pub commit_message: Option<String>,
}

impl PushEvent {
    /// Extract the relevant fields from an already-parsed payload.
    pub fn from_value(payload: &serde_json::Value) -> Self {
        Self {
            git_ref: payload["ref"].as_str().map(|s| s.to_string()),
            repository_name: payload["repository"]["name"].as_str().map(|s| s.to_string()),
            pusher: payload["pusher"]["name"].as_str().map(|s| s.to_string()),
            commit_sha: payload["head_commit"]["id"].as_str().map(|s| s.to_string()),
            commit_message: payload["head_commit"]["message"].as_str().map(|s| s.to_string()),
        }
    }

    /// Short human-readable reference for logs and the deployment run record.
    pub fn describe(&self) -> String {
        let sha = self
            .commit_sha
            .as_deref()
            .map(|s| &s[..s.len().min(8)])
            .unwrap_or("unknown");
        let pusher = self.pusher.as_deref().unwrap_or("unknown");
        format!(
            "{}@{} by {}",
            self.git_ref.as_deref().unwrap_or("unknown"),
            sha,
            pusher
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_fields() {
        let payload = serde_json::json!({
            "ref": "refs/heads/main",
            "repository": {"name": "brightbudget-backend"},
            "pusher": {"name": "alice"},
            "head_commit": {"id": "0123456789abcdef", "message": "fix budget rounding"},
        });

        let event = PushEvent::from_value(&payload);
        assert_eq!(event.git_ref.as_deref(), Some("refs/heads/main"));
        assert_eq!(event.repository_name.as_deref(), Some("brightbudget-backend"));
        assert_eq!(event.pusher.as_deref(), Some("alice"));
        assert_eq!(event.describe(), "refs/heads/main@01234567 by alice");
    }

    #[test]
    fn missing_fields_decode_as_none() {
        let payload = serde_json::json!({"zen": "Design for failure."});
        let event = PushEvent::from_value(&payload);
        assert!(event.git_ref.is_none());
        assert!(event.repository_name.is_none());
        assert_eq!(event.describe(), "unknown@unknown by unknown");
    }
}
