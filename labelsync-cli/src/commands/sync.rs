//! `labelsync sync <manifest> --owner <owner>`: reconcile and report.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use labelsync_renderer::{Renderer, ReportKind, TemplateContext};
use labelsync_sync::{sync_manifest, SyncOptions, SyncReport};

use crate::github::GithubClient;

/// Arguments for `labelsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to labelsync.yml.
    pub manifest: PathBuf,

    /// Organisation or user owning the repositories.
    #[arg(long)]
    pub owner: String,

    /// Compute and report changes without applying them.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the Markdown overview here instead of printing it.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write the sibling (aliased issues) report here.
    #[arg(long, value_name = "FILE")]
    pub siblings: Option<PathBuf>,
}

impl SyncArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = super::load_manifest(&self.manifest)?;
        let settings = super::load_settings()?;
        let renderer = match &settings.templates_dir {
            Some(dir) => Renderer::with_templates(dir),
            None => Renderer::new(),
        }
        .context("failed to load report templates")?;
        let client = GithubClient::from_settings(&settings);

        let options = SyncOptions {
            persist: !self.dry_run,
            per_page: settings.per_page,
        };
        let reports = sync_manifest(&client, &self.owner, &manifest, options).await;
        print_summary(&reports, self.dry_run);

        let ctx = TemplateContext::from_reports(&reports).generated_at(Utc::now());
        let overview = renderer
            .render_with_context(&ctx, ReportKind::Overview)
            .context("failed to render report")?;
        match &self.report {
            Some(path) => write_report(path, &overview)?,
            None => println!("\n{overview}"),
        }
        if let Some(path) = &self.siblings {
            let siblings = renderer
                .render_with_context(&ctx, ReportKind::Siblings)
                .context("failed to render sibling report")?;
            write_report(path, &siblings)?;
        }

        let failed = reports.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            bail!("{failed} of {} repositories failed to sync", reports.len());
        }
        Ok(())
    }
}

fn write_report(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("failed to write report to '{}'", path.display()))?;
    println!("  ✎  {}", path.display());
    Ok(())
}

fn print_summary(reports: &[SyncReport], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if reports.is_empty() {
        println!("{prefix}No repositories configured.");
        return;
    }
    for report in reports {
        match report {
            SyncReport::Success {
                repo,
                additions,
                updates,
                removals,
                siblings,
                ..
            } => println!(
                "{prefix}{} '{repo}' ({} created, {} updated, {} removed, {} issues aliased)",
                "✓".green().bold(),
                additions.len(),
                updates.len(),
                removals.len(),
                siblings.len(),
            ),
            SyncReport::Failure { repo, message } => {
                println!("{prefix}{} '{repo}': {message}", "✗".red().bold())
            }
        }
    }
}
