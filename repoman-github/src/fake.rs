//! In-memory `GitHubApi` used by the unit tests

use async_trait::async_trait;
use repoman_core::{not_found_error, repository_error, Owner, RepomanResult, RepositoryRef};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::api::{
    FileCommit, FileContent, FileWriteRequest, GitHubApi, IssueRecord, Page, PageRequest,
};

#[derive(Default)]
pub(crate) struct FakeGitHub {
    repos: HashMap<String, Vec<RepositoryRef>>,
    issues: HashMap<String, Vec<IssueRecord>>,
    files: Mutex<HashMap<(String, String), String>>,
    failing_repos: HashSet<String>,
    failing_list_page: Option<u32>,
    failing_issue_pages: HashSet<(String, u32)>,
    pub(crate) writes: Mutex<Vec<(String, FileWriteRequest)>>,
}

impl FakeGitHub {
    pub(crate) fn with_repos(mut self, owner: &str, names: &[&str]) -> Self {
        self.repos.insert(
            owner.to_string(),
            names.iter().map(|n| RepositoryRef::new(*n)).collect(),
        );
        self
    }

    /// Issues as `(state, is_pull_request)` pairs
    pub(crate) fn with_issues(mut self, repo: &str, issues: &[(&str, bool)]) -> Self {
        let records = issues
            .iter()
            .map(|(state, is_pr)| IssueRecord {
                state: state.to_string(),
                is_pull_request: *is_pr,
            })
            .collect();
        self.issues.insert(repo.to_string(), records);
        self
    }

    pub(crate) fn with_file(self, repo: &str, path: &str, sha: &str) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert((repo.to_string(), path.to_string()), sha.to_string());
        }
        self
    }

    /// Every call touching `repo` fails with a non-404 error
    pub(crate) fn failing(mut self, repo: &str) -> Self {
        self.failing_repos.insert(repo.to_string());
        self
    }

    pub(crate) fn failing_list_page(mut self, page: u32) -> Self {
        self.failing_list_page = Some(page);
        self
    }

    /// The issue listing of `repo` fails on `page`; earlier pages still succeed
    pub(crate) fn failing_issue_page(mut self, repo: &str, page: u32) -> Self {
        self.failing_issue_pages.insert((repo.to_string(), page));
        self
    }

    fn check(&self, repo: &str) -> RepomanResult<()> {
        if self.failing_repos.contains(repo) {
            return Err(Box::new(repository_error!(
                format!("HTTP 500 error for {}", repo),
                "fake_github"
            )));
        }
        Ok(())
    }

    fn exists(&self, owner: &str, repo: &str) -> bool {
        self.repos
            .get(owner)
            .is_some_and(|repos| repos.iter().any(|r| r.name == repo))
    }
}

fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let per_page = request.per_page.max(1) as usize;
    let start = (request.page.saturating_sub(1) as usize) * per_page;
    let end = (start + per_page).min(items.len());
    let slice = if start < items.len() {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Page {
        items: slice,
        next_page: (end < items.len()).then_some(request.page + 1),
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn get_repository(&self, owner: &str, repo: &str) -> RepomanResult<RepositoryRef> {
        self.check(repo)?;
        if !self.exists(owner, repo) {
            return Err(Box::new(not_found_error!(
                format!("{}/{}", owner, repo),
                "fake_github"
            )));
        }
        Ok(RepositoryRef::new(repo))
    }

    async fn list_repositories(
        &self,
        owner: &Owner,
        page: PageRequest,
    ) -> RepomanResult<Page<RepositoryRef>> {
        if self.failing_list_page == Some(page.page) {
            return Err(Box::new(repository_error!("HTTP 502 error", "fake_github")));
        }
        match self.repos.get(&owner.name) {
            Some(repos) => Ok(paginate(repos, page)),
            None => Err(Box::new(not_found_error!(&owner.name, "fake_github"))),
        }
    }

    async fn list_issues(
        &self,
        _owner: &str,
        repo: &str,
        page: PageRequest,
    ) -> RepomanResult<Page<IssueRecord>> {
        self.check(repo)?;
        if self.failing_issue_pages.contains(&(repo.to_string(), page.page)) {
            return Err(Box::new(repository_error!(
                format!("HTTP 502 error listing issues of {} (page {})", repo, page.page),
                "fake_github"
            )));
        }
        let issues = self.issues.get(repo).cloned().unwrap_or_default();
        Ok(paginate(&issues, page))
    }

    async fn get_file(&self, owner: &str, repo: &str, path: &str) -> RepomanResult<FileContent> {
        self.check(repo)?;
        let sha = self
            .files
            .lock()
            .ok()
            .and_then(|files| files.get(&(repo.to_string(), path.to_string())).cloned());
        match sha {
            Some(sha) => Ok(FileContent {
                path: path.to_string(),
                sha,
            }),
            None => Err(Box::new(not_found_error!(
                format!("{}/{}/{}", owner, repo, path),
                "fake_github"
            ))),
        }
    }

    async fn put_file(
        &self,
        _owner: &str,
        repo: &str,
        path: &str,
        request: &FileWriteRequest,
    ) -> RepomanResult<FileCommit> {
        self.check(repo)?;
        let new_sha = format!("sha-{}", repo);
        if let Ok(mut files) = self.files.lock() {
            files.insert((repo.to_string(), path.to_string()), new_sha.clone());
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((repo.to_string(), request.clone()));
        }
        Ok(FileCommit {
            content_sha: Some(new_sha),
            commit_sha: Some(format!("commit-{}", repo)),
        })
    }
}
