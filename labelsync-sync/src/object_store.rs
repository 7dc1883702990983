//! In-memory, content-addressed object store.
//!
//! Implements [`ObjectRemote`] without a network: objects are keyed by the
//! SHA-256 hex digest of their canonical encoding, refs live in a map. Used
//! for bootstrap dry runs and as the reference store in tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use labelsync_core::RepoRef;

use crate::error::SyncError;
use crate::remote::ObjectRemote;
use crate::tree::{EntryMode, GhTree, TreeEntry, TreeHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Object {
    Blob(String),
    Tree(Vec<TreeEntry>),
    Commit {
        tree: TreeHandle,
        parents: Vec<TreeHandle>,
        message: String,
    },
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, Object>,
    repos: HashSet<RepoRef>,
    refs: HashMap<(RepoRef, String), TreeHandle>,
    blob_writes: usize,
    tree_writes: usize,
}

/// Object store living entirely in memory.
#[derive(Debug)]
pub struct MemoryObjectStore {
    initial_branch: String,
    state: Mutex<State>,
}

impl MemoryObjectStore {
    /// Repositories created in this store start with one empty commit on
    /// `initial_branch`.
    pub fn new(initial_branch: impl Into<String>) -> Self {
        Self {
            initial_branch: initial_branch.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Commit `branch` of `repo` currently points at.
    pub fn head(&self, repo: &RepoRef, branch: &str) -> Option<TreeHandle> {
        self.lock()
            .refs
            .get(&(repo.clone(), branch.to_owned()))
            .cloned()
    }

    /// Tree and parents of a commit.
    pub fn commit(&self, handle: &TreeHandle) -> Option<(TreeHandle, Vec<TreeHandle>)> {
        match self.lock().objects.get(&handle.0) {
            Some(Object::Commit { tree, parents, .. }) => Some((tree.clone(), parents.clone())),
            _ => None,
        }
    }

    /// Every `(path, content)` leaf reachable from a tree.
    pub fn read_tree(&self, handle: &TreeHandle) -> Result<GhTree, SyncError> {
        let state = self.lock();
        let mut out = GhTree::new();
        read_into(&state, handle, "", &mut out)?;
        Ok(out)
    }

    /// Number of `create_blob` calls served.
    pub fn blob_writes(&self) -> usize {
        self.lock().blob_writes
    }

    /// Number of `create_tree` calls served.
    pub fn tree_writes(&self) -> usize {
        self.lock().tree_writes
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store(&self, object: Object) -> TreeHandle {
        let sha = digest(&object);
        self.lock().objects.insert(sha.clone(), object);
        TreeHandle(sha)
    }

    fn require_repo(&self, repo: &RepoRef) -> Result<(), SyncError> {
        if self.lock().repos.contains(repo) {
            Ok(())
        } else {
            Err(SyncError::remote("find repository", repo, "no such repository"))
        }
    }
}

fn read_into(
    state: &State,
    handle: &TreeHandle,
    prefix: &str,
    out: &mut GhTree,
) -> Result<(), SyncError> {
    let Some(Object::Tree(entries)) = state.objects.get(&handle.0) else {
        return Err(SyncError::InvalidTree(format!("{handle} is not a tree")));
    };
    for entry in entries {
        let path = format!("{prefix}{}", entry.path);
        match (entry.mode, state.objects.get(&entry.sha.0)) {
            (EntryMode::File, Some(Object::Blob(content))) => {
                out.insert(path, content.clone());
            }
            (EntryMode::Directory, Some(Object::Tree(_))) => {
                read_into(state, &entry.sha, &format!("{path}/"), out)?;
            }
            _ => {
                return Err(SyncError::InvalidTree(format!(
                    "{path} does not point at a {}",
                    entry.mode.kind()
                )))
            }
        }
    }
    Ok(())
}

fn digest(object: &Object) -> String {
    let mut h = Sha256::new();
    match object {
        Object::Blob(content) => {
            h.update(format!("blob {}\0", content.len()));
            h.update(content.as_bytes());
        }
        Object::Tree(entries) => {
            h.update(b"tree\0");
            for entry in entries {
                h.update(format!(
                    "{} {} {}\t{}\n",
                    entry.mode.mode(),
                    entry.mode.kind(),
                    entry.sha,
                    entry.path
                ));
            }
        }
        Object::Commit {
            tree,
            parents,
            message,
        } => {
            h.update(format!("commit\0tree {tree}\n"));
            for parent in parents {
                h.update(format!("parent {parent}\n"));
            }
            h.update(format!("\n{message}"));
        }
    }
    hex::encode(h.finalize())
}

#[async_trait]
impl ObjectRemote for MemoryObjectStore {
    async fn create_repository(&self, repo: &RepoRef, _description: &str) -> Result<(), SyncError> {
        if !self.lock().repos.insert(repo.clone()) {
            return Err(SyncError::remote("create repository", repo, "already exists"));
        }
        let empty = self.store(Object::Tree(Vec::new()));
        let initial = self.store(Object::Commit {
            tree: empty,
            parents: Vec::new(),
            message: "Initial commit".to_owned(),
        });
        self.lock()
            .refs
            .insert((repo.clone(), self.initial_branch.clone()), initial);
        Ok(())
    }

    async fn create_blob(&self, repo: &RepoRef, content: &str) -> Result<TreeHandle, SyncError> {
        self.require_repo(repo)?;
        self.lock().blob_writes += 1;
        Ok(self.store(Object::Blob(content.to_owned())))
    }

    async fn create_tree(
        &self,
        repo: &RepoRef,
        entries: &[TreeEntry],
    ) -> Result<TreeHandle, SyncError> {
        self.require_repo(repo)?;
        {
            let state = self.lock();
            if let Some(entry) = entries.iter().find(|e| !state.objects.contains_key(&e.sha.0)) {
                return Err(SyncError::remote(
                    "create tree in",
                    repo,
                    format!("unknown object {} for {}", entry.sha, entry.path),
                ));
            }
        }
        self.lock().tree_writes += 1;
        Ok(self.store(Object::Tree(entries.to_vec())))
    }

    async fn get_ref(&self, repo: &RepoRef, branch: &str) -> Result<TreeHandle, SyncError> {
        self.head(repo, branch)
            .ok_or_else(|| SyncError::remote("read ref of", repo, format!("no branch '{branch}'")))
    }

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree: &TreeHandle,
        parents: &[TreeHandle],
    ) -> Result<TreeHandle, SyncError> {
        self.require_repo(repo)?;
        Ok(self.store(Object::Commit {
            tree: tree.clone(),
            parents: parents.to_vec(),
            message: message.to_owned(),
        }))
    }

    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        commit: &TreeHandle,
    ) -> Result<(), SyncError> {
        self.require_repo(repo)?;
        let mut state = self.lock();
        if !matches!(state.objects.get(&commit.0), Some(Object::Commit { .. })) {
            return Err(SyncError::remote("update ref of", repo, format!("{commit} is not a commit")));
        }
        state.refs.insert((repo.clone(), branch.to_owned()), commit.clone());
        Ok(())
    }
}
