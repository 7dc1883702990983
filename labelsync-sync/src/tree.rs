//! Tree builder and configuration-repository bootstrap.
//!
//! A [`GhTree`] is a flat `path → content` map. It is folded into a
//! [`TreeNode`] trie first, then created bottom-up: sibling blobs and
//! sibling subtrees concurrently, each parent only after all its children.
//! Recursion depth equals directory depth.

use std::collections::BTreeMap;
use std::fmt;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use labelsync_core::{RepoRef, Settings};

use crate::error::SyncError;
use crate::remote::ObjectRemote;

/// Slash-delimited relative path → UTF-8 file content.
pub type GhTree = BTreeMap<String, String>;

/// Opaque reference to a blob, tree or commit in the remote object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeHandle(pub String);

impl fmt::Display for TreeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TreeHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TreeHandle {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    File,
    Directory,
}

impl EntryMode {
    /// Git file mode.
    pub fn mode(&self) -> &'static str {
        match self {
            EntryMode::File => "100644",
            EntryMode::Directory => "040000",
        }
    }

    /// Git object type.
    pub fn kind(&self) -> &'static str {
        match self {
            EntryMode::File => "blob",
            EntryMode::Directory => "tree",
        }
    }
}

/// One entry of a tree node, named relative to that node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: EntryMode,
    pub sha: TreeHandle,
}

// ---------------------------------------------------------------------------
// Path trie
// ---------------------------------------------------------------------------

/// A directory: its direct files and its subdirectories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub files: BTreeMap<String, String>,
    pub dirs: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// Fold a flat tree into a trie.
    ///
    /// Empty and `.` segments are ignored, so `/a//b` and `./a/b` both mean
    /// `a/b`. Fails when a path is empty, appears twice after
    /// normalization, or is used both as a file and as a directory.
    pub fn from_flat(tree: &GhTree) -> Result<Self, SyncError> {
        let mut root = TreeNode::default();
        for (path, content) in tree {
            let segments: Vec<&str> = path
                .split('/')
                .filter(|s| !s.is_empty() && *s != ".")
                .collect();
            let Some((file, dirs)) = segments.split_last() else {
                return Err(SyncError::InvalidTree(format!("empty path '{path}'")));
            };

            let mut node = &mut root;
            for dir in dirs {
                if node.files.contains_key(*dir) {
                    return Err(SyncError::InvalidTree(format!(
                        "'{path}' nests under a file"
                    )));
                }
                node = node.dirs.entry((*dir).to_owned()).or_default();
            }
            if node.dirs.contains_key(*file) {
                return Err(SyncError::InvalidTree(format!(
                    "'{path}' is also a directory"
                )));
            }
            if node.files.insert((*file).to_owned(), content.clone()).is_some() {
                return Err(SyncError::InvalidTree(format!("duplicate path '{path}'")));
            }
        }
        Ok(root)
    }

    /// Number of directory levels below this node.
    pub fn depth(&self) -> usize {
        self.dirs.values().map(|d| d.depth() + 1).max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Create every blob and tree of `tree` in `repo`; returns the root tree.
pub async fn build_tree<R>(remote: &R, repo: &RepoRef, tree: &GhTree) -> Result<TreeHandle, SyncError>
where
    R: ObjectRemote + ?Sized,
{
    let root = TreeNode::from_flat(tree)?;
    tracing::debug!(repo = %repo, files = tree.len(), depth = root.depth(), "building tree");
    create_node(remote, repo, &root).await
}

fn create_node<'a, R>(
    remote: &'a R,
    repo: &'a RepoRef,
    node: &'a TreeNode,
) -> BoxFuture<'a, Result<TreeHandle, SyncError>>
where
    R: ObjectRemote + ?Sized,
{
    async move {
        let blobs = try_join_all(node.files.iter().map(|(name, content)| async move {
            let sha = remote.create_blob(repo, content).await?;
            Ok::<_, SyncError>(TreeEntry {
                path: name.clone(),
                mode: EntryMode::File,
                sha,
            })
        }));
        let trees = try_join_all(node.dirs.iter().map(|(name, child)| async move {
            let sha = create_node(remote, repo, child).await?;
            Ok::<_, SyncError>(TreeEntry {
                path: name.clone(),
                mode: EntryMode::Directory,
                sha,
            })
        }));
        let (blobs, trees) = futures::try_join!(blobs, trees)?;

        let entries: Vec<TreeEntry> = trees.into_iter().chain(blobs).collect();
        remote.create_tree(repo, &entries).await
    }
    .boxed()
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Identity of the bootstrap commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub branch: String,
    pub message: String,
    pub description: String,
}

impl From<&Settings> for BootstrapOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            branch: settings.default_branch.clone(),
            message: settings.commit_message.clone(),
            description: "LabelSync configuration repository.".to_owned(),
        }
    }
}

/// Handles produced by a successful bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapResult {
    pub tree: TreeHandle,
    pub commit: TreeHandle,
}

/// Create `repo` and commit `tree` onto its branch in a single commit.
///
/// `repo` must not exist yet. Any failing step aborts the bootstrap; objects
/// already created are left behind.
pub async fn bootstrap_config_repository<R>(
    remote: &R,
    repo: &RepoRef,
    tree: &GhTree,
    options: &BootstrapOptions,
) -> Result<BootstrapResult, SyncError>
where
    R: ObjectRemote + ?Sized,
{
    remote.create_repository(repo, &options.description).await?;

    let tree_sha = build_tree(remote, repo, tree).await?;
    let head = remote.get_ref(repo, &options.branch).await?;
    let commit = remote
        .create_commit(repo, &options.message, &tree_sha, &[head])
        .await?;
    remote.update_ref(repo, &options.branch, &commit).await?;

    tracing::info!(repo = %repo, commit = %commit, "bootstrapped configuration repository");
    Ok(BootstrapResult {
        tree: tree_sha,
        commit,
    })
}
