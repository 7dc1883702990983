//! Collaborator interfaces the engine drives.
//!
//! Implementations own transport, auth and rate limiting. Every method is
//! independently failable and reports failures as [`SyncError::Remote`].

use async_trait::async_trait;

use labelsync_core::{Issue, Label, RepoRef};

use crate::error::SyncError;
use crate::pagination::collect_pages;
use crate::tree::{TreeEntry, TreeHandle};

/// Label and issue access for one or more repositories.
#[async_trait]
pub trait LabelRemote: Send + Sync {
    /// One page of the repository's labels (pages start at 1).
    async fn labels_page(
        &self,
        repo: &RepoRef,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Label>, SyncError>;

    /// Every label of the repository.
    ///
    /// Paginates through [`labels_page`](Self::labels_page); clients whose
    /// transport already paginates may override it.
    async fn fetch_labels(&self, repo: &RepoRef, per_page: u32) -> Result<Vec<Label>, SyncError> {
        collect_pages(per_page, |page| self.labels_page(repo, page, per_page)).await
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<(), SyncError>;

    /// Update the label currently named `current_name` to match `label`
    /// (renaming it when the names differ).
    async fn update_label(
        &self,
        repo: &RepoRef,
        current_name: &str,
        label: &Label,
    ) -> Result<(), SyncError>;

    async fn delete_label(&self, repo: &RepoRef, name: &str) -> Result<(), SyncError>;

    /// One page of open issues (pages start at 1).
    async fn issues_page(
        &self,
        repo: &RepoRef,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Issue>, SyncError>;

    async fn add_labels_to_issue(
        &self,
        repo: &RepoRef,
        issue: u64,
        labels: &[String],
    ) -> Result<(), SyncError>;
}

/// Git object store of a repository, used by the bootstrap flow.
#[async_trait]
pub trait ObjectRemote: Send + Sync {
    /// Create `repo` with an initial commit on its default branch.
    async fn create_repository(&self, repo: &RepoRef, description: &str) -> Result<(), SyncError>;

    async fn create_blob(&self, repo: &RepoRef, content: &str) -> Result<TreeHandle, SyncError>;

    async fn create_tree(
        &self,
        repo: &RepoRef,
        entries: &[TreeEntry],
    ) -> Result<TreeHandle, SyncError>;

    /// Commit the branch currently points at.
    async fn get_ref(&self, repo: &RepoRef, branch: &str) -> Result<TreeHandle, SyncError>;

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree: &TreeHandle,
        parents: &[TreeHandle],
    ) -> Result<TreeHandle, SyncError>;

    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        commit: &TreeHandle,
    ) -> Result<(), SyncError>;
}

/// Repositories visible to the current installation credential.
#[async_trait]
pub trait InstallationRemote: Send + Sync {
    /// Names of one page of installed repositories (pages start at 1).
    async fn installed_repos_page(&self, page: u32, per_page: u32) -> Result<Vec<String>, SyncError>;
}
