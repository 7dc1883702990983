//! Installation access check.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::SyncError;
use crate::pagination::Paginator;
use crate::remote::InstallationRemote;

/// Whether the installation can reach every configured repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum InstallationAccess {
    Sufficient,
    Insufficient {
        /// Required names (as given) the installation cannot see.
        missing: Vec<String>,
        /// Every repository the installation can see, lowercased.
        accessible: Vec<String>,
    },
}

impl InstallationAccess {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, InstallationAccess::Sufficient)
    }
}

/// Compare `required` repository names against the installed repositories.
///
/// Names compare case-insensitively. An empty `required` list is
/// `Sufficient` without a single page fetch.
pub async fn check_access<R>(
    remote: &R,
    required: &[String],
    per_page: u32,
) -> Result<InstallationAccess, SyncError>
where
    R: InstallationRemote + ?Sized,
{
    if required.is_empty() {
        return Ok(InstallationAccess::Sufficient);
    }

    let mut pages = Paginator::new(per_page);
    let mut accessible: Vec<String> = Vec::new();
    while let Some(page) = pages.next_page() {
        let names = remote.installed_repos_page(page, pages.per_page()).await?;
        pages.advance(names.len());
        accessible.extend(names.into_iter().map(|n| n.to_lowercase()));
    }

    let known: HashSet<&str> = accessible.iter().map(String::as_str).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !known.contains(name.to_lowercase().as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        return Ok(InstallationAccess::Sufficient);
    }

    tracing::info!(missing = ?missing, "installation cannot reach every repository");
    Ok(InstallationAccess::Insufficient {
        missing,
        accessible,
    })
}
