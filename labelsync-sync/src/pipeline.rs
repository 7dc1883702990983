//! Sync pipeline: fetch one snapshot, reconcile, apply, report.
//!
//! Repositories are isolated: a failing repository yields a
//! [`SyncReport::Failure`] and the next repository is processed as usual.

use futures::future::try_join_all;

use labelsync_core::{manifest, Label, Manifest, RepoConfig, RepoRef};

use crate::aliases::propagate_aliases;
use crate::error::SyncError;
use crate::reconcile::{reconcile, LabelDiff};
use crate::remote::LabelRemote;
use crate::report::SyncReport;

/// Options for a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Apply intents. `false` computes and reports them only.
    pub persist: bool,
    /// Page size for label and issue listings.
    pub per_page: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            persist: true,
            per_page: 100,
        }
    }
}

/// Sync every repository of `manifest`, one after another.
pub async fn sync_manifest<R>(
    remote: &R,
    owner: &str,
    manifest: &Manifest,
    options: SyncOptions,
) -> Vec<SyncReport>
where
    R: LabelRemote + ?Sized,
{
    let mut reports = Vec::with_capacity(manifest.repos.len());
    for (name, config) in &manifest.repos {
        let repo = RepoRef::new(owner, name.as_str());
        reports.push(sync_repository(remote, &repo, config, options).await);
    }
    reports
}

/// Sync from raw manifest text.
///
/// An unusable manifest means there is nothing to reconcile: no remote call
/// is made and no report is produced.
pub async fn sync_from_source<R>(
    remote: &R,
    owner: &str,
    source: Option<&str>,
    options: SyncOptions,
) -> Vec<SyncReport>
where
    R: LabelRemote + ?Sized,
{
    match source.and_then(manifest::parse_lenient) {
        Some(manifest) => sync_manifest(remote, owner, &manifest, options).await,
        None => {
            tracing::debug!(owner, "no usable manifest, skipping sync");
            Vec::new()
        }
    }
}

/// Sync one repository. Never fails; errors become a `Failure` report.
pub async fn sync_repository<R>(
    remote: &R,
    repo: &RepoRef,
    config: &RepoConfig,
    options: SyncOptions,
) -> SyncReport
where
    R: LabelRemote + ?Sized,
{
    match run_repository(remote, repo, config, options).await {
        Ok(report) => {
            tracing::info!(repo = %repo, dry_run = !options.persist, "synced labels");
            report
        }
        Err(err) => {
            tracing::warn!(repo = %repo, "sync failed: {err}");
            SyncReport::Failure {
                repo: repo.repo.clone(),
                message: err.to_string(),
            }
        }
    }
}

async fn run_repository<R>(
    remote: &R,
    repo: &RepoRef,
    config: &RepoConfig,
    options: SyncOptions,
) -> Result<SyncReport, SyncError>
where
    R: LabelRemote + ?Sized,
{
    let current = remote.fetch_labels(repo, options.per_page).await?;
    let diff = reconcile(&config.directives(), &current, config.config);

    if options.persist {
        apply_definitions(remote, repo, &diff).await?;
    }

    let siblings =
        propagate_aliases(remote, repo, &diff.aliases, options.per_page, options.persist).await?;

    if options.persist {
        try_join_all(diff.removals.iter().map(|l| remote.delete_label(repo, &l.name))).await?;
    }

    let LabelDiff {
        additions,
        updates,
        removals,
        unconfigured,
        aliases,
    } = diff;

    Ok(SyncReport::Success {
        repo: repo.repo.clone(),
        config: config.config,
        additions,
        updates,
        aliases,
        removals,
        unconfigured,
        siblings,
        dry_run: !options.persist,
    })
}

async fn apply_definitions<R>(remote: &R, repo: &RepoRef, diff: &LabelDiff) -> Result<(), SyncError>
where
    R: LabelRemote + ?Sized,
{
    let creates = try_join_all(diff.additions.iter().map(|l| remote.create_label(repo, l)));
    let updates = try_join_all(
        diff.updates
            .iter()
            .map(|l| remote.update_label(repo, current_name(l), l)),
    );
    futures::try_join!(creates, updates)?;
    Ok(())
}

/// Name the remote currently knows an updated label by.
fn current_name(label: &Label) -> &str {
    label.old_name.as_deref().unwrap_or(&label.name)
}

/// Whether a newly created label must be pruned from a strict repository.
pub fn strict_guard(config: &RepoConfig, label_name: &str) -> bool {
    config.is_strict() && !config.configures(label_name)
}

/// Delete `label_name` when [`strict_guard`] says so. Returns whether the
/// label was deleted.
pub async fn prune_label<R>(
    remote: &R,
    repo: &RepoRef,
    config: &RepoConfig,
    label_name: &str,
) -> Result<bool, SyncError>
where
    R: LabelRemote + ?Sized,
{
    if !strict_guard(config, label_name) {
        return Ok(false);
    }
    remote.delete_label(repo, label_name).await?;
    tracing::info!(repo = %repo, label = label_name, "pruned unconfigured label");
    Ok(true)
}
