//! Subcommand implementations. Each `*Args` struct owns a `run` method.

pub mod access;
pub mod bootstrap;
pub mod check;
pub mod plan;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};

use labelsync_core::{manifest, settings, Manifest, Settings};

/// Load and validate a manifest, failing before any remote is contacted.
pub(crate) fn load_manifest(path: &Path) -> Result<Manifest> {
    manifest::load_at(path)
        .with_context(|| format!("invalid manifest '{}'", path.display()))
}

pub(crate) fn load_settings() -> Result<Settings> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    settings::load_at(&home).with_context(|| {
        format!(
            "failed to load settings from '{}'",
            settings::settings_path_at(&home).display()
        )
    })
}
