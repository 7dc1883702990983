//! `labelsync plan <manifest> --owner <owner>`: dry-run sync as a table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use labelsync_core::Label;
use labelsync_sync::{sync_manifest, SyncOptions, SyncReport};

use crate::github::GithubClient;

/// Arguments for `labelsync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to labelsync.yml.
    pub manifest: PathBuf,

    /// Organisation or user owning the repositories.
    #[arg(long)]
    pub owner: String,

    /// Emit the reports as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "repository")]
    repo: String,
    #[tabled(rename = "create")]
    create: String,
    #[tabled(rename = "update")]
    update: String,
    #[tabled(rename = "alias")]
    alias: String,
    #[tabled(rename = "delete")]
    delete: String,
    #[tabled(rename = "unconfigured")]
    unconfigured: String,
}

impl PlanArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = super::load_manifest(&self.manifest)?;
        let settings = super::load_settings()?;
        let client = GithubClient::from_settings(&settings);

        let options = SyncOptions {
            persist: false,
            per_page: settings.per_page,
        };
        let reports = sync_manifest(&client, &self.owner, &manifest, options).await;

        if self.json {
            let json = serde_json::to_string_pretty(&reports).context("failed to serialize plan")?;
            println!("{json}");
            return Ok(());
        }
        print_plan(&reports);
        Ok(())
    }
}

fn names(labels: &[Label]) -> String {
    if labels.is_empty() {
        return "-".to_string();
    }
    labels
        .iter()
        .map(|l| match &l.old_name {
            Some(old) if *old != l.name => format!("{old} → {}", l.name),
            _ => l.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_plan(reports: &[SyncReport]) {
    let mut rows = Vec::new();
    for report in reports {
        match report {
            SyncReport::Success {
                repo,
                additions,
                updates,
                aliases,
                removals,
                unconfigured,
                ..
            } => rows.push(PlanRow {
                repo: repo.clone(),
                create: names(additions),
                update: names(updates),
                alias: names(aliases),
                delete: names(removals),
                unconfigured: names(unconfigured),
            }),
            SyncReport::Failure { repo, message } => {
                eprintln!("{} '{repo}': {message}", "✗".red().bold());
            }
        }
    }
    if rows.is_empty() {
        println!("Nothing to plan.");
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
