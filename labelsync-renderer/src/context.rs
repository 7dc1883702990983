//! Template context: serializable rendering payload built from sync reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labelsync_core::Label;
use labelsync_sync::{IssueAlias, SyncReport};

use crate::error::RenderError;

/// Rendering payload shared by every report template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub reports: Vec<RepoCtx>,
    /// At least one successful repository aliased labels onto issues.
    pub has_siblings: bool,
    pub meta: MetaCtx,
}

/// One repository section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RepoCtx {
    Success {
        repo: String,
        /// Leftover labels were deleted and are framed as "removed".
        strict: bool,
        /// `removeUnconfiguredLabels` as configured. Without `strict` it
        /// only adds a note under the unconfigured labels.
        remove_unconfigured: bool,
        dry_run: bool,
        additions: Vec<LabelCtx>,
        updates: Vec<LabelCtx>,
        aliases: Vec<LabelCtx>,
        /// Removals of a strict repository, unconfigured labels otherwise.
        leftover: Vec<LabelCtx>,
        siblings: Vec<SiblingCtx>,
    },
    Failure {
        repo: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCtx {
    pub name: String,
    pub color: String,
    pub old_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingCtx {
    pub issue: u64,
    pub title: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub labelsync_version: String,
    pub generated_at: Option<DateTime<Utc>>,
}

impl From<&Label> for LabelCtx {
    fn from(label: &Label) -> Self {
        LabelCtx {
            name: label.name.clone(),
            color: label.color.clone(),
            old_name: label.old_name.clone(),
        }
    }
}

impl From<&IssueAlias> for SiblingCtx {
    fn from(alias: &IssueAlias) -> Self {
        SiblingCtx {
            issue: alias.issue,
            title: alias.title.clone(),
            labels: alias.labels.clone(),
        }
    }
}

fn labels(labels: &[Label]) -> Vec<LabelCtx> {
    labels.iter().map(LabelCtx::from).collect()
}

impl From<&SyncReport> for RepoCtx {
    fn from(report: &SyncReport) -> Self {
        match report {
            SyncReport::Success {
                repo,
                config,
                additions,
                updates,
                aliases,
                removals,
                unconfigured,
                siblings,
                dry_run,
            } => RepoCtx::Success {
                repo: repo.clone(),
                strict: config.strict,
                remove_unconfigured: config.remove_unconfigured_labels,
                dry_run: *dry_run,
                additions: self::labels(additions),
                updates: self::labels(updates),
                aliases: self::labels(aliases),
                leftover: removals.iter().chain(unconfigured).map(LabelCtx::from).collect(),
                siblings: siblings.iter().map(SiblingCtx::from).collect(),
            },
            SyncReport::Failure { repo, message } => RepoCtx::Failure {
                repo: repo.clone(),
                message: message.clone(),
            },
        }
    }
}

impl TemplateContext {
    /// Build a [`TemplateContext`] from the reports of one sync run.
    pub fn from_reports(reports: &[SyncReport]) -> Self {
        let reports: Vec<RepoCtx> = reports.iter().map(RepoCtx::from).collect();
        let has_siblings = reports
            .iter()
            .any(|r| matches!(r, RepoCtx::Success { siblings, .. } if !siblings.is_empty()));

        TemplateContext {
            reports,
            has_siblings,
            meta: MetaCtx {
                labelsync_version: env!("CARGO_PKG_VERSION").to_string(),
                generated_at: None,
            },
        }
    }

    /// Stamp the context with a generation time, shown in the report footer.
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.meta.generated_at = Some(at);
        self
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
