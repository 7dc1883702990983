//! GitHub REST client.
//!
//! `ureq` is blocking; every request runs on Tokio's blocking pool so the
//! engine's `current_thread` scheduler keeps going while it waits.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use labelsync_core::{Issue, Label, RepoRef, Settings};
use labelsync_sync::{
    InstallationRemote, LabelRemote, ObjectRemote, SyncError, TreeEntry, TreeHandle,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(String),
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => ClientError::Status {
                code,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(t) => ClientError::Transport(t.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IssueWire {
    number: u64,
    title: String,
    #[serde(default)]
    labels: Vec<NameWire>,
}

#[derive(Deserialize)]
struct NameWire {
    name: String,
}

#[derive(Deserialize)]
struct ShaWire {
    sha: String,
}

#[derive(Deserialize)]
struct RefWire {
    object: ShaWire,
}

#[derive(Deserialize)]
struct InstallationWire {
    repositories: Vec<NameWire>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for one API endpoint.
#[derive(Clone)]
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Client for `settings.api_url`, authenticated with the token found in
    /// `settings.token_env` (anonymous when unset).
    pub fn from_settings(settings: &Settings) -> Self {
        let token = std::env::var(&settings.token_env).ok().filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(var = %settings.token_env, "no API token set, requests are anonymous");
        }
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(30))
                .user_agent(concat!("labelsync/", env!("CARGO_PKG_VERSION")))
                .build(),
            api_url: settings.api_url.trim_end_matches('/').to_owned(),
            token,
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let req = self
            .agent
            .request(method, &format!("{}{path}", self.api_url))
            .set("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str, page: u32, per_page: u32) -> Result<T, ClientError> {
        tracing::debug!(path, page, "GET");
        let response = self
            .request("GET", path)
            .query("page", &page.to_string())
            .query("per_page", &per_page.to_string())
            .call()?;
        Ok(response.into_json()?)
    }

    fn send<T: DeserializeOwned>(&self, method: &str, path: &str, body: Value) -> Result<T, ClientError> {
        tracing::debug!(method, path, "request");
        let response = self.request(method, path).send_json(body)?;
        Ok(response.into_json()?)
    }

    fn send_empty(&self, method: &str, path: &str, body: Option<Value>) -> Result<(), ClientError> {
        tracing::debug!(method, path, "request");
        let req = self.request(method, path);
        match body {
            Some(body) => req.send_json(body)?,
            None => req.call()?,
        };
        Ok(())
    }

    /// Run `f` on the blocking pool, mapping any failure to
    /// [`SyncError::Remote`] for `op` on `target`.
    async fn blocking<T, F>(&self, op: &'static str, target: String, f: F) -> Result<T, SyncError>
    where
        T: Send + 'static,
        F: FnOnce(GithubClient) -> Result<T, ClientError> + Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || f(client))
            .await
            .map_err(|e| ClientError::Join(e.to_string()))
            .and_then(|r| r)
            .map_err(|e| SyncError::remote(op, target, e))
    }
}

fn repo_path(repo: &RepoRef) -> String {
    format!("/repos/{}/{}", repo.owner, repo.repo)
}

fn label_path(repo: &RepoRef, name: &str) -> String {
    format!("{}/labels/{}", repo_path(repo), urlencoding::encode(name))
}

fn entry_json(entry: &TreeEntry) -> Value {
    json!({
        "path": entry.path,
        "mode": entry.mode.mode(),
        "type": entry.mode.kind(),
        "sha": entry.sha.0,
    })
}

#[async_trait]
impl LabelRemote for GithubClient {
    async fn labels_page(
        &self,
        repo: &RepoRef,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Label>, SyncError> {
        let path = format!("{}/labels", repo_path(repo));
        self.blocking("list labels of", repo.to_string(), move |c| {
            c.get(&path, page, per_page)
        })
        .await
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<(), SyncError> {
        let path = format!("{}/labels", repo_path(repo));
        let body = json!({
            "name": label.name,
            "color": label.color,
            "description": label.description.clone().unwrap_or_default(),
        });
        self.blocking("create label", format!("{repo}#{}", label.name), move |c| {
            c.send::<Value>("POST", &path, body).map(drop)
        })
        .await
    }

    async fn update_label(
        &self,
        repo: &RepoRef,
        current_name: &str,
        label: &Label,
    ) -> Result<(), SyncError> {
        let path = label_path(repo, current_name);
        let body = json!({
            "new_name": label.name,
            "color": label.color,
            "description": label.description.clone().unwrap_or_default(),
        });
        self.blocking("update label", format!("{repo}#{current_name}"), move |c| {
            c.send::<Value>("PATCH", &path, body).map(drop)
        })
        .await
    }

    async fn delete_label(&self, repo: &RepoRef, name: &str) -> Result<(), SyncError> {
        let path = label_path(repo, name);
        self.blocking("delete label", format!("{repo}#{name}"), move |c| {
            c.send_empty("DELETE", &path, None)
        })
        .await
    }

    async fn issues_page(
        &self,
        repo: &RepoRef,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Issue>, SyncError> {
        let path = format!("{}/issues", repo_path(repo));
        self.blocking("list issues of", repo.to_string(), move |c| {
            let wire: Vec<IssueWire> = c.get(&path, page, per_page)?;
            Ok(wire
                .into_iter()
                .map(|i| Issue {
                    number: i.number,
                    title: i.title,
                    labels: i.labels.into_iter().map(|l| l.name).collect(),
                })
                .collect())
        })
        .await
    }

    async fn add_labels_to_issue(
        &self,
        repo: &RepoRef,
        issue: u64,
        labels: &[String],
    ) -> Result<(), SyncError> {
        let path = format!("{}/issues/{issue}/labels", repo_path(repo));
        let body = json!({ "labels": labels });
        self.blocking("label issue", format!("{repo}#{issue}"), move |c| {
            c.send_empty("POST", &path, Some(body))
        })
        .await
    }
}

#[async_trait]
impl ObjectRemote for GithubClient {
    async fn create_repository(&self, repo: &RepoRef, description: &str) -> Result<(), SyncError> {
        let path = format!("/orgs/{}/repos", repo.owner);
        let body = json!({
            "name": repo.repo,
            "description": description,
            "auto_init": true,
        });
        self.blocking("create repository", repo.to_string(), move |c| {
            c.send::<Value>("POST", &path, body).map(drop)
        })
        .await
    }

    async fn create_blob(&self, repo: &RepoRef, content: &str) -> Result<TreeHandle, SyncError> {
        let path = format!("{}/git/blobs", repo_path(repo));
        let body = json!({ "content": content, "encoding": "utf-8" });
        self.blocking("create blob in", repo.to_string(), move |c| {
            c.send::<ShaWire>("POST", &path, body).map(|w| TreeHandle(w.sha))
        })
        .await
    }

    async fn create_tree(
        &self,
        repo: &RepoRef,
        entries: &[TreeEntry],
    ) -> Result<TreeHandle, SyncError> {
        let path = format!("{}/git/trees", repo_path(repo));
        let body = json!({ "tree": entries.iter().map(entry_json).collect::<Vec<_>>() });
        self.blocking("create tree in", repo.to_string(), move |c| {
            c.send::<ShaWire>("POST", &path, body).map(|w| TreeHandle(w.sha))
        })
        .await
    }

    async fn get_ref(&self, repo: &RepoRef, branch: &str) -> Result<TreeHandle, SyncError> {
        let path = format!("{}/git/ref/heads/{branch}", repo_path(repo));
        self.blocking("read ref of", repo.to_string(), move |c| {
            tracing::debug!(path = %path, "GET");
            let wire: RefWire = c.request("GET", &path).call()?.into_json()?;
            Ok(TreeHandle(wire.object.sha))
        })
        .await
    }

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree: &TreeHandle,
        parents: &[TreeHandle],
    ) -> Result<TreeHandle, SyncError> {
        let path = format!("{}/git/commits", repo_path(repo));
        let body = json!({
            "message": message,
            "tree": tree.0,
            "parents": parents.iter().map(|p| p.0.as_str()).collect::<Vec<_>>(),
        });
        self.blocking("create commit in", repo.to_string(), move |c| {
            c.send::<ShaWire>("POST", &path, body).map(|w| TreeHandle(w.sha))
        })
        .await
    }

    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        commit: &TreeHandle,
    ) -> Result<(), SyncError> {
        let path = format!("{}/git/refs/heads/{branch}", repo_path(repo));
        let body = json!({ "sha": commit.0, "force": false });
        self.blocking("update ref of", repo.to_string(), move |c| {
            c.send::<Value>("PATCH", &path, body).map(drop)
        })
        .await
    }
}

#[async_trait]
impl InstallationRemote for GithubClient {
    async fn installed_repos_page(&self, page: u32, per_page: u32) -> Result<Vec<String>, SyncError> {
        self.blocking("list repositories of", "installation".to_owned(), move |c| {
            let wire: InstallationWire = c.get("/installation/repositories", page, per_page)?;
            Ok(wire.repositories.into_iter().map(|r| r.name).collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelsync_sync::EntryMode;

    #[test]
    fn label_names_are_escaped_in_paths() {
        let repo = RepoRef::new("acme", "api");
        assert_eq!(
            label_path(&repo, "good first issue"),
            "/repos/acme/api/labels/good%20first%20issue"
        );
        assert_eq!(label_path(&repo, "kind/bug"), "/repos/acme/api/labels/kind%2Fbug");
    }

    #[test]
    fn tree_entries_use_git_modes() {
        let entry = TreeEntry {
            path: "docs".into(),
            mode: EntryMode::Directory,
            sha: TreeHandle::from("abc"),
        };
        assert_eq!(
            entry_json(&entry),
            json!({ "path": "docs", "mode": "040000", "type": "tree", "sha": "abc" })
        );
    }

    #[test]
    fn remote_labels_deserialize_from_api_shape() {
        let body = r#"[{"id":1,"name":"bug","color":"d73a4a","default":true,"description":null}]"#;
        let labels: Vec<Label> = serde_json::from_str(body).unwrap();
        assert_eq!(labels[0].name, "bug");
        assert!(labels[0].default);
        assert_eq!(labels[0].description, None);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_api_url() {
        let settings = Settings {
            api_url: "https://ghe.example.com/api/v3/".into(),
            token_env: "LABELSYNC_TEST_UNSET_TOKEN".into(),
            ..Settings::default()
        };
        let client = GithubClient::from_settings(&settings);
        assert_eq!(client.api_url, "https://ghe.example.com/api/v3");
        assert!(client.token.is_none());
    }
}
