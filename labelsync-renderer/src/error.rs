//! Error types for labelsync-renderer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A template failed to parse or render, or the context did not convert.
    #[error("report template error: {0}")]
    Template(#[from] tera::Error),

    /// The configured templates directory exists but is not a directory.
    #[error("templates directory {path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// A template override could not be read.
    #[error("couldn't read template override {path}: {source}")]
    Override {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
