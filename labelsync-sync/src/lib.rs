//! # labelsync-sync
//!
//! Reconciliation engine and the flows built around it.
//!
//! Call [`reconcile`] for the pure label diff, [`sync_repository`] /
//! [`sync_manifest`] to diff and apply against a [`LabelRemote`],
//! [`bootstrap_config_repository`] to scaffold a configuration repository,
//! and [`check_access`] to validate an installation.

pub mod access;
pub mod aliases;
pub mod error;
pub mod object_store;
pub mod pagination;
pub mod pipeline;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod tree;

pub use access::{check_access, InstallationAccess};
pub use aliases::{plan_aliases, propagate_aliases, IssueAlias};
pub use error::SyncError;
pub use object_store::MemoryObjectStore;
pub use pagination::{collect_pages, Paginator};
pub use pipeline::{prune_label, strict_guard, sync_from_source, sync_manifest, sync_repository, SyncOptions};
pub use reconcile::{reconcile, LabelDiff};
pub use remote::{InstallationRemote, LabelRemote, ObjectRemote};
pub use report::SyncReport;
pub use tree::{
    bootstrap_config_repository, build_tree, BootstrapOptions, BootstrapResult, EntryMode,
    GhTree, TreeEntry, TreeHandle, TreeNode,
};
