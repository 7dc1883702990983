//! In-memory remote shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use labelsync_core::{Issue, Label, RepoRef};
use labelsync_sync::{InstallationRemote, LabelRemote, SyncError};

#[derive(Debug, Default)]
struct State {
    labels: HashMap<String, Vec<Label>>,
    issues: HashMap<String, Vec<Issue>>,
    installed: Vec<String>,
    calls: Vec<String>,
    fail_on: Option<String>,
}

/// Labels and issues per repository, plus a log of every call made.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(self, repo: &str, labels: Vec<Label>) -> Self {
        self.state.lock().unwrap().labels.insert(repo.to_owned(), labels);
        self
    }

    pub fn with_issues(self, repo: &str, issues: Vec<Issue>) -> Self {
        self.state.lock().unwrap().issues.insert(repo.to_owned(), issues);
        self
    }

    pub fn with_installed(self, names: &[&str]) -> Self {
        self.state.lock().unwrap().installed = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Fail every call whose log entry starts with `prefix`.
    pub fn failing_on(self, prefix: &str) -> Self {
        self.state.lock().unwrap().fail_on = Some(prefix.to_owned());
        self
    }

    pub fn labels(&self, repo: &str) -> Vec<Label> {
        self.state
            .lock()
            .unwrap()
            .labels
            .get(repo)
            .cloned()
            .unwrap_or_default()
    }

    pub fn label_names(&self, repo: &str) -> Vec<String> {
        self.labels(repo).into_iter().map(|l| l.name).collect()
    }

    pub fn issue(&self, repo: &str, number: u64) -> Option<Issue> {
        self.state
            .lock()
            .unwrap()
            .issues
            .get(repo)
            .and_then(|issues| issues.iter().find(|i| i.number == number).cloned())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list"))
            .collect()
    }

    fn record(&self, call: String) -> Result<(), SyncError> {
        let mut state = self.state.lock().unwrap();
        let fails = state
            .fail_on
            .as_deref()
            .is_some_and(|prefix| call.starts_with(prefix));
        state.calls.push(call.clone());
        if fails {
            return Err(SyncError::remote("perform", call, "injected failure"));
        }
        Ok(())
    }
}

fn page<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    items
        .iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl LabelRemote for MemoryRemote {
    async fn labels_page(
        &self,
        repo: &RepoRef,
        page_no: u32,
        per_page: u32,
    ) -> Result<Vec<Label>, SyncError> {
        self.record(format!("list labels {} {page_no}", repo.repo))?;
        Ok(page(&self.labels(&repo.repo), page_no, per_page))
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<(), SyncError> {
        self.record(format!("create {} {}", repo.repo, label.name))?;
        let mut state = self.state.lock().unwrap();
        state.labels.entry(repo.repo.clone()).or_default().push(Label {
            old_name: None,
            old_color: None,
            old_description: None,
            ..label.clone()
        });
        Ok(())
    }

    async fn update_label(
        &self,
        repo: &RepoRef,
        current_name: &str,
        label: &Label,
    ) -> Result<(), SyncError> {
        self.record(format!("update {} {current_name}->{}", repo.repo, label.name))?;
        let mut state = self.state.lock().unwrap();
        let labels = state.labels.entry(repo.repo.clone()).or_default();
        match labels.iter_mut().find(|l| l.name == current_name) {
            Some(existing) => {
                existing.name = label.name.clone();
                existing.color = label.color.clone();
                existing.description = label.description.clone();
                Ok(())
            }
            None => Err(SyncError::remote("update", current_name, "not found")),
        }
    }

    async fn delete_label(&self, repo: &RepoRef, name: &str) -> Result<(), SyncError> {
        self.record(format!("delete {} {name}", repo.repo))?;
        let mut state = self.state.lock().unwrap();
        if let Some(labels) = state.labels.get_mut(&repo.repo) {
            labels.retain(|l| l.name != name);
        }
        Ok(())
    }

    async fn issues_page(
        &self,
        repo: &RepoRef,
        page_no: u32,
        per_page: u32,
    ) -> Result<Vec<Issue>, SyncError> {
        self.record(format!("list issues {} {page_no}", repo.repo))?;
        let issues = self
            .state
            .lock()
            .unwrap()
            .issues
            .get(&repo.repo)
            .cloned()
            .unwrap_or_default();
        Ok(page(&issues, page_no, per_page))
    }

    async fn add_labels_to_issue(
        &self,
        repo: &RepoRef,
        issue: u64,
        labels: &[String],
    ) -> Result<(), SyncError> {
        self.record(format!("tag {} #{issue} {}", repo.repo, labels.join(",")))?;
        let mut state = self.state.lock().unwrap();
        if let Some(found) = state
            .issues
            .get_mut(&repo.repo)
            .and_then(|issues| issues.iter_mut().find(|i| i.number == issue))
        {
            found.labels.extend(labels.iter().cloned());
        }
        Ok(())
    }
}

#[async_trait]
impl InstallationRemote for MemoryRemote {
    async fn installed_repos_page(&self, page_no: u32, per_page: u32) -> Result<Vec<String>, SyncError> {
        self.record(format!("list installed {page_no}"))?;
        let installed = self.state.lock().unwrap().installed.clone();
        Ok(page(&installed, page_no, per_page))
    }
}

pub fn issue(number: u64, labels: &[&str]) -> Issue {
    Issue {
        number,
        title: format!("Issue {number}"),
        labels: labels.iter().map(|s| s.to_string()).collect(),
    }
}
