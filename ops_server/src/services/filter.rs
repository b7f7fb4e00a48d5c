//! Event filtering — only pushes to the configured branch of the configured
//! repository trigger a deployment. Everything else is acknowledged and
//! ignored so the sender never retries.

use crate::models::event::PushEvent;

/// True iff the event is an exact match on both the git ref and the
/// repository name. A missing field is a non-match, not an error.
pub fn qualifies(event: &PushEvent, branch_ref: &str, repo_name: &str) -> bool {
    event.git_ref.as_deref() == Some(branch_ref)
        && event.repository_name.as_deref() == Some(repo_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRANCH: &str = "refs/heads/main";
    const REPO: &str = "brightbudget-backend";

    fn event(git_ref: Option<&str>, repo: Option<&str>) -> PushEvent {
        PushEvent {
            git_ref: git_ref.map(|s| s.to_string()),
            repository_name: repo.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn exact_pair_qualifies() {
        assert!(qualifies(&event(Some(BRANCH), Some(REPO)), BRANCH, REPO));
    }

    #[test]
    fn any_other_pair_does_not() {
        assert!(!qualifies(&event(Some("refs/heads/develop"), Some(REPO)), BRANCH, REPO));
        assert!(!qualifies(&event(Some(BRANCH), Some("some-fork")), BRANCH, REPO));
        assert!(!qualifies(
            &event(Some("refs/tags/v1.0"), Some("some-fork")),
            BRANCH,
            REPO
        ));
        // prefix is not a match
        assert!(!qualifies(&event(Some("refs/heads/main2"), Some(REPO)), BRANCH, REPO));
    }

    #[test]
    fn missing_fields_are_non_matches_not_errors() {
        assert!(!qualifies(&event(None, Some(REPO)), BRANCH, REPO));
        assert!(!qualifies(&event(Some(BRANCH), None), BRANCH, REPO));
        assert!(!qualifies(&event(None, None), BRANCH, REPO));
    }
}
