//! User settings at `~/.labelsync/settings.yaml`.
//!
//! # API pattern
//!
//! Every function that touches the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()` and delegates to `_at`
//!
//! A missing settings file is not an error: every field has a default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ManifestError;

/// Tunables for the remote client and the bootstrap flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// REST API base URL.
    pub api_url: String,
    /// Environment variable holding the API token.
    pub token_env: String,
    /// Page size for every paginated listing.
    pub per_page: u32,
    /// Branch the bootstrap commit is pushed to.
    pub default_branch: String,
    pub commit_message: String,
    /// Directory of `.tera` files overriding the embedded report templates.
    pub templates_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_owned(),
            token_env: "GITHUB_TOKEN".to_owned(),
            per_page: 100,
            default_branch: "master".to_owned(),
            commit_message: ":sparkles: Scaffold configuration".to_owned(),
            templates_dir: None,
        }
    }
}

/// `<home>/.labelsync/settings.yaml`. Pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".labelsync").join("settings.yaml")
}

/// Load settings, falling back to defaults when the file is absent.
///
/// Returns `ManifestError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Settings, ManifestError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ManifestError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ManifestError> {
    load_at(&home()?)
}

fn home() -> Result<PathBuf, ManifestError> {
    dirs::home_dir().ok_or(ManifestError::HomeNotFound)
}
