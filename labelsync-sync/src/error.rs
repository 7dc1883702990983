//! Error types for labelsync-sync.

use std::fmt;

use thiserror::Error;

/// All errors that can arise from sync, bootstrap and access operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote call failed. `op` is the verb ("create", "list labels of"),
    /// `target` what it acted on.
    #[error("couldn't {op} {target}: {message}")]
    Remote {
        op: &'static str,
        target: String,
        message: String,
    },

    /// The flat tree handed to the tree builder cannot form a directory tree.
    #[error("invalid tree: {0}")]
    InvalidTree(String),
}

impl SyncError {
    /// Convenience constructor for [`SyncError::Remote`].
    pub fn remote(op: &'static str, target: impl fmt::Display, message: impl fmt::Display) -> Self {
        SyncError::Remote {
            op,
            target: target.to_string(),
            message: message.to_string(),
        }
    }
}
