// Test doubles: an in-memory platform with call counters and a manual clock.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::cache::Clock;
use crate::error::{MetricsError, Result};
use crate::github::{
    Commit, CommitAuthor, CommitDetail, ContentEntry, ContentType, Issue, IssueState, Owner,
    OwnerType, PullRequest, Repository,
};
use crate::platform::{Platform, ScopeTarget};

/// Parse an RFC 3339 timestamp.
pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .unwrap()
        .with_timezone(&Utc)
}

#[derive(Clone)]
pub struct ManualClock(Rc<Cell<DateTime<Utc>>>);

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn advance(&self, by: TimeDelta) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

#[derive(Default)]
pub struct FakePlatform {
    pub repos: Vec<Repository>,
    pub issues: HashMap<String, Vec<Issue>>,
    pub pulls: HashMap<String, Vec<PullRequest>>,
    pub commits: HashMap<String, Vec<Commit>>,
    pub tree: HashMap<(String, String), Vec<ContentEntry>>,
    /// `(method, "owner/repo")` for every issue and pull request fetch.
    pub owners: Vec<(&'static str, String)>,
    calls: HashMap<&'static str, usize>,
}

impl FakePlatform {
    pub fn add_dir(&mut self, repo: &str, path: &str, entries: Vec<ContentEntry>) {
        self.tree.insert((repo.to_string(), path.to_string()), entries);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.get(method).copied().unwrap_or(0)
    }

    fn record(&mut self, method: &'static str) {
        *self.calls.entry(method).or_insert(0) += 1;
    }
}

fn missing(what: &str) -> MetricsError {
    MetricsError::NotFound(what.to_string())
}

impl Platform for FakePlatform {
    async fn list_repositories(&mut self, _target: &ScopeTarget) -> Result<Vec<Repository>> {
        self.record("list_repositories");
        Ok(self.repos.clone())
    }

    async fn repository(&mut self, owner: &str, name: &str) -> Result<Repository> {
        self.record("repository");
        let mut repo = self
            .repos
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| missing(name))?;
        repo.owner.login = owner.to_string();
        Ok(repo)
    }

    async fn closed_issues(&mut self, owner: &str, repo: &str) -> Result<Vec<Issue>> {
        self.record("closed_issues");
        self.owners.push(("closed_issues", format!("{}/{}", owner, repo)));
        self.issues.get(repo).cloned().ok_or_else(|| missing(repo))
    }

    async fn closed_pull_requests(&mut self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        self.record("closed_pull_requests");
        self.owners.push(("closed_pull_requests", format!("{}/{}", owner, repo)));
        self.pulls.get(repo).cloned().ok_or_else(|| missing(repo))
    }

    async fn commits(
        &mut self,
        _owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>> {
        self.record("commits");
        let commits = self.commits.get(repo).ok_or_else(|| missing(repo))?;
        Ok(commits
            .iter()
            .filter(|c| {
                let date = c.date();
                since.is_none_or(|s| date.is_some_and(|d| d >= s))
                    && until.is_none_or(|u| date.is_some_and(|d| d <= u))
            })
            .cloned()
            .collect())
    }

    async fn contents(
        &mut self,
        _owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>> {
        self.record("contents");
        self.tree
            .get(&(repo.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| missing(path))
    }
}

pub fn repository(name: &str) -> Repository {
    Repository {
        id: 1,
        name: name.to_string(),
        full_name: format!("charliermarsh/{}", name),
        owner: Owner {
            id: 1,
            login: "charliermarsh".to_string(),
            owner_type: OwnerType::User,
        },
        private: false,
        fork: false,
        default_branch: Some("main".to_string()),
        description: None,
        updated_at: at("2024-01-01T00:00:00Z"),
        pushed_at: None,
    }
}

pub fn issue(
    number: u64,
    title: &str,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
) -> Issue {
    Issue {
        id: number,
        number,
        title: title.to_string(),
        state: if closed_at.is_some() {
            IssueState::Closed
        } else {
            IssueState::Open
        },
        created_at,
        closed_at,
        html_url: format!("https://github.com/charliermarsh/ruff/issues/{}", number),
        pull_request: None,
    }
}

pub fn pull(
    number: u64,
    title: &str,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
) -> PullRequest {
    PullRequest {
        id: number,
        number,
        title: title.to_string(),
        state: if closed_at.is_some() {
            IssueState::Closed
        } else {
            IssueState::Open
        },
        created_at,
        closed_at,
        merged_at: closed_at,
        html_url: format!("https://github.com/charliermarsh/ruff/pull/{}", number),
    }
}

pub fn commit(sha: &str, date: DateTime<Utc>) -> Commit {
    let author = CommitAuthor {
        name: Some("dev".to_string()),
        email: Some("dev@example.com".to_string()),
        date: Some(date),
    };
    Commit {
        sha: sha.to_string(),
        commit: CommitDetail {
            message: format!("commit {}", sha),
            author: Some(author.clone()),
            committer: Some(author),
        },
        html_url: None,
    }
}

fn entry(path: &str, content_type: ContentType) -> ContentEntry {
    ContentEntry {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        sha: format!("sha-{}", path),
        size: 0,
        content_type,
        download_url: None,
    }
}

pub fn file(path: &str) -> ContentEntry {
    entry(path, ContentType::File)
}

pub fn dir(path: &str) -> ContentEntry {
    entry(path, ContentType::Dir)
}
