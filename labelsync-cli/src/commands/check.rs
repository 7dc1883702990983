//! `labelsync check <manifest>`: offline validation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use labelsync_core::{LabelDirective, Manifest};

/// Arguments for `labelsync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to labelsync.yml.
    pub manifest: PathBuf,
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "repository")]
    repo: String,
    #[tabled(rename = "strict")]
    strict: String,
    #[tabled(rename = "labels")]
    labels: usize,
    #[tabled(rename = "renames")]
    renames: String,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let manifest = super::load_manifest(&self.manifest)?;
        println!(
            "✓ '{}' is valid ({} repositories)",
            self.manifest.display(),
            manifest.repos.len()
        );
        if !manifest.repos.is_empty() {
            let mut table = Table::new(rows(&manifest));
            table.with(Style::rounded());
            println!("{table}");
        }
        Ok(())
    }
}

fn rows(manifest: &Manifest) -> Vec<CheckRow> {
    manifest
        .repos
        .iter()
        .map(|(name, config)| {
            let renames: Vec<String> = config
                .directives()
                .iter()
                .filter_map(|d| match d {
                    LabelDirective::Rename { from, to } => Some(format!("{from} → {}", to.name)),
                    LabelDirective::Define(_) => None,
                })
                .collect();
            CheckRow {
                repo: name.clone(),
                strict: if config.is_strict() { "yes" } else { "no" }.to_string(),
                labels: config.labels.len(),
                renames: if renames.is_empty() {
                    "-".to_string()
                } else {
                    renames.join(", ")
                },
            }
        })
        .collect()
}
