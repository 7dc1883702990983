//! LabelSync core library — domain types, manifest loading, settings, errors.
//!
//! - [`types`] — labels, issues, manifest and directive types
//! - [`manifest`] — parse / load `labelsync.yml`
//! - [`settings`] — `~/.labelsync/settings.yaml`
//! - [`error`] — [`ManifestError`]

pub mod error;
pub mod manifest;
pub mod settings;
pub mod types;

pub use error::ManifestError;
pub use settings::Settings;
pub use types::{
    Issue, Label, LabelDirective, LabelSpec, Manifest, RepoConfig, RepoPolicy, RepoRef,
};
