//! `labelsync access <manifest>`: can the installation reach every repo?

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use labelsync_sync::{check_access, InstallationAccess};

use crate::github::GithubClient;

/// Arguments for `labelsync access`.
#[derive(Args, Debug)]
pub struct AccessArgs {
    /// Path to labelsync.yml.
    pub manifest: PathBuf,
}

impl AccessArgs {
    pub async fn run(self) -> Result<()> {
        let manifest = super::load_manifest(&self.manifest)?;
        let settings = super::load_settings()?;
        let client = GithubClient::from_settings(&settings);

        let required = manifest.repo_names();
        let access = check_access(&client, &required, settings.per_page)
            .await
            .context("failed to list installed repositories")?;

        match access {
            InstallationAccess::Sufficient => {
                println!(
                    "{} installation reaches all {} configured repositories",
                    "✓".green().bold(),
                    required.len()
                );
                Ok(())
            }
            InstallationAccess::Insufficient {
                missing,
                accessible,
            } => {
                println!("{} installation cannot reach:", "✗".red().bold());
                for name in &missing {
                    println!("  - {name}");
                }
                println!("Accessible: {}", accessible.join(", "));
                bail!("{} repositories are not accessible", missing.len())
            }
        }
    }
}
