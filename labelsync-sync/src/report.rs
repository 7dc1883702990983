//! Per-repository sync outcome.

use serde::Serialize;

use labelsync_core::{Label, RepoPolicy};

use crate::aliases::IssueAlias;

/// One report per repository per sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum SyncReport {
    Success {
        repo: String,
        config: RepoPolicy,
        additions: Vec<Label>,
        updates: Vec<Label>,
        aliases: Vec<Label>,
        removals: Vec<Label>,
        unconfigured: Vec<Label>,
        /// Issues that gained renamed labels.
        siblings: Vec<IssueAlias>,
        /// Intents were computed but not applied.
        dry_run: bool,
    },
    Failure {
        repo: String,
        message: String,
    },
}

impl SyncReport {
    pub fn repo(&self) -> &str {
        match self {
            SyncReport::Success { repo, .. } | SyncReport::Failure { repo, .. } => repo,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncReport::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_serialize_with_status_tag() {
        let failure = SyncReport::Failure {
            repo: "api".into(),
            message: "boom".into(),
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["status"], "Failure");
        assert_eq!(value["repo"], "api");

        let success = SyncReport::Success {
            repo: "web".into(),
            config: RepoPolicy::default(),
            additions: vec![Label::new("bug", "f00")],
            updates: Vec::new(),
            aliases: Vec::new(),
            removals: Vec::new(),
            unconfigured: Vec::new(),
            siblings: Vec::new(),
            dry_run: true,
        };
        let value = serde_json::to_value(&success).unwrap();
        assert_eq!(value["status"], "Success");
        assert_eq!(value["additions"][0]["name"], "bug");
        assert_eq!(value["config"]["strict"], false);
        assert_eq!(success.repo(), "web");
        assert!(!failure.is_success());
    }
}
