//! Error types for labelsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading a manifest or settings.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure (permission denied, not a file, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error, with the file path and the line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A label entry has no color, so it could never be created.
    #[error("label '{label}' in repository '{repo}' has no color")]
    MissingColor { repo: String, label: String },

    /// Two labels of one repository rename the same remote label.
    #[error("repository '{repo}' renames '{old_name}' more than once")]
    DuplicateRename { repo: String, old_name: String },

    /// The manifest file did not exist at the expected path.
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`, so `~/.labelsync/` cannot be located.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
