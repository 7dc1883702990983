//! `labelsync bootstrap <dir> --owner <owner>`: create the configuration
//! repository from a local scaffold in one commit.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use labelsync_core::{manifest, RepoRef};
use labelsync_sync::{
    bootstrap_config_repository, BootstrapOptions, BootstrapResult, GhTree, MemoryObjectStore,
};

use crate::github::GithubClient;

/// Arguments for `labelsync bootstrap`.
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Directory holding the files to commit (must contain labelsync.yml).
    pub dir: PathBuf,

    /// Organisation the repository is created in.
    #[arg(long)]
    pub owner: String,

    /// Repository name (default: `<owner>-labelsync`).
    #[arg(long)]
    pub repo: Option<String>,

    /// Build the commit against an in-memory store; nothing is pushed.
    #[arg(long)]
    pub dry_run: bool,
}

impl BootstrapArgs {
    pub async fn run(self) -> Result<()> {
        let settings = super::load_settings()?;
        let tree = read_tree(&self.dir)?;

        let manifest_src = tree.get(manifest::MANIFEST_PATH).with_context(|| {
            format!(
                "'{}' has no {} at its root",
                self.dir.display(),
                manifest::MANIFEST_PATH
            )
        })?;
        manifest::parse(manifest_src, self.dir.join(manifest::MANIFEST_PATH))
            .context("refusing to bootstrap an invalid manifest")?;

        let name = self
            .repo
            .clone()
            .unwrap_or_else(|| manifest::config_repo_name(&self.owner));
        let repo = RepoRef::new(self.owner.as_str(), name);
        let options = BootstrapOptions::from(&settings);

        let result = if self.dry_run {
            let store = MemoryObjectStore::new(options.branch.as_str());
            bootstrap_config_repository(&store, &repo, &tree, &options).await
        } else {
            let client = GithubClient::from_settings(&settings);
            bootstrap_config_repository(&client, &repo, &tree, &options).await
        }
        .with_context(|| format!("failed to bootstrap '{repo}'"))?;

        print_result(&repo, &tree, &result, &options, self.dry_run);
        Ok(())
    }
}

/// Read every file under `dir` into a tree keyed by `/`-separated relative
/// paths. `.git` directories are skipped; files must be UTF-8.
pub(crate) fn read_tree(dir: &Path) -> Result<GhTree> {
    if !dir.is_dir() {
        bail!("'{}' is not a directory", dir.display());
    }
    let mut tree = GhTree::new();
    collect(dir, dir, &mut tree)?;
    Ok(tree)
}

fn collect(root: &Path, dir: &Path, tree: &mut GhTree) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("cannot read '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot read '{}'", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("cannot stat '{}'", path.display()))?;
        if file_type.is_dir() {
            if entry.file_name() == ".git" {
                continue;
            }
            collect(root, &path, tree)?;
        } else if file_type.is_file() {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("'{}' is not a UTF-8 file", path.display()))?;
            tree.insert(key, content);
        }
    }
    Ok(())
}

fn print_result(
    repo: &RepoRef,
    tree: &GhTree,
    result: &BootstrapResult,
    options: &BootstrapOptions,
    dry_run: bool,
) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}✓ '{repo}' bootstrapped on '{}' ({} files)",
        options.branch,
        tree.len()
    );
    println!("  tree:   {}", result.tree);
    println!("  commit: {}", result.commit);
    for path in tree.keys() {
        println!("  +  {path}");
    }
}
