//! `labelsync.yml` loading.
//!
//! The manifest lives in a dedicated configuration repository named
//! `<owner>-labelsync`, at the path [`MANIFEST_PATH`]. Fetching it from the
//! remote is a collaborator concern; this module turns its text into a typed
//! [`Manifest`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::types::Manifest;

/// Path of the manifest inside the configuration repository.
pub const MANIFEST_PATH: &str = "labelsync.yml";

/// Name of the configuration repository for `owner`.
pub fn config_repo_name(owner: &str) -> String {
    format!("{owner}-labelsync")
}

/// Parse manifest text. `path` is only used to annotate errors.
pub fn parse(contents: &str, path: impl Into<PathBuf>) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = serde_yaml::from_str(contents).map_err(|e| ManifestError::Parse {
        path: path.into(),
        source: e,
    })?;
    validate(&manifest)?;
    Ok(manifest)
}

/// Load and parse the manifest at `path`.
///
/// Returns `ManifestError::NotFound` if absent,
/// `ManifestError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Manifest, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    parse(&contents, path)
}

/// Parse, treating any unusable manifest as "nothing to reconcile".
pub fn parse_lenient(contents: &str) -> Option<Manifest> {
    match parse(contents, MANIFEST_PATH) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            tracing::debug!("ignoring unusable manifest: {err}");
            None
        }
    }
}

fn validate(manifest: &Manifest) -> Result<(), ManifestError> {
    for (repo, config) in &manifest.repos {
        let mut renamed = HashSet::new();
        for (name, spec) in &config.labels {
            if spec.color.as_deref().map_or(true, |c| c.trim().is_empty()) {
                return Err(ManifestError::MissingColor {
                    repo: repo.clone(),
                    label: name.clone(),
                });
            }
            if let Some(old_name) = spec.old_name.as_deref() {
                if old_name != name && !renamed.insert(old_name) {
                    return Err(ManifestError::DuplicateRename {
                        repo: repo.clone(),
                        old_name: old_name.to_owned(),
                    });
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
