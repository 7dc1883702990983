//! Sibling (alias) propagation.
//!
//! Renamed labels are added to every open issue still tagged with their old
//! name. The old tag stays on the issue; both coexist.

use futures::future::try_join_all;
use serde::Serialize;

use labelsync_core::{Issue, Label, RepoRef};

use crate::error::SyncError;
use crate::pagination::Paginator;
use crate::remote::LabelRemote;

/// Labels to add to one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueAlias {
    pub issue: u64,
    pub title: String,
    pub labels: Vec<String>,
}

/// Decide which issues need which new labels.
///
/// Only labels carrying an `old_name` participate. Labels an issue already
/// carries are not added again.
pub fn plan_aliases(renamed: &[Label], issues: &[Issue]) -> Vec<IssueAlias> {
    issues
        .iter()
        .filter_map(|issue| {
            let mut missing: Vec<String> = Vec::new();
            for label in renamed {
                let Some(old_name) = label.old_name.as_deref() else {
                    continue;
                };
                if issue.has_label(old_name)
                    && !issue.has_label(&label.name)
                    && !missing.contains(&label.name)
                {
                    missing.push(label.name.clone());
                }
            }
            (!missing.is_empty()).then(|| IssueAlias {
                issue: issue.number,
                title: issue.title.clone(),
                labels: missing,
            })
        })
        .collect()
}

/// Scan every open issue of `repo` and add the renamed labels where the old
/// name is in use.
///
/// Makes no remote call at all when no label carries an `old_name`. With
/// `persist == false` the issues are scanned but left untouched.
pub async fn propagate_aliases<R>(
    remote: &R,
    repo: &RepoRef,
    renamed: &[Label],
    per_page: u32,
    persist: bool,
) -> Result<Vec<IssueAlias>, SyncError>
where
    R: LabelRemote + ?Sized,
{
    let renamed: Vec<Label> = renamed
        .iter()
        .filter(|l| l.old_name.is_some())
        .cloned()
        .collect();
    if renamed.is_empty() {
        return Ok(Vec::new());
    }

    let mut pages = Paginator::new(per_page);
    let mut planned = Vec::new();
    while let Some(page) = pages.next_page() {
        let issues = remote.issues_page(repo, page, pages.per_page()).await?;
        pages.advance(issues.len());
        planned.extend(plan_aliases(&renamed, &issues));
    }

    tracing::debug!(repo = %repo, issues = planned.len(), "alias plan ready");

    if persist {
        try_join_all(
            planned
                .iter()
                .map(|alias| remote.add_labels_to_issue(repo, alias.issue, &alias.labels)),
        )
        .await?;
    }

    Ok(planned)
}
