// Platform seam between the scope cache and the hosting service.
// `GitHubClient` is the production implementation; tests substitute a fake.

#![allow(async_fn_in_trait)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::{MetricsError, Result};
use crate::github::{Commit, ContentEntry, GitHubClient, Issue, PullRequest, Repository};

/// The user, organization, or team whose repositories are measured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeTarget {
    User(String),
    Organization(String),
    Team { org: String, slug: String },
}

impl ScopeTarget {
    /// Login that owns the repositories of this scope.
    pub fn owner(&self) -> &str {
        match self {
            ScopeTarget::User(login) | ScopeTarget::Organization(login) => login,
            ScopeTarget::Team { org, .. } => org,
        }
    }
}

impl fmt::Display for ScopeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeTarget::User(login) => write!(f, "user {}", login),
            ScopeTarget::Organization(org) => write!(f, "org {}", org),
            ScopeTarget::Team { org, slug } => write!(f, "team {}/{}", org, slug),
        }
    }
}

/// Kind of scope named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeKind {
    #[default]
    User,
    Organization,
    Team,
}

impl FromStr for ScopeKind {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(ScopeKind::User),
            "org" | "organization" => Ok(ScopeKind::Organization),
            "team" => Ok(ScopeKind::Team),
            other => Err(MetricsError::InvalidScopeKind(other.to_string())),
        }
    }
}

/// Read-only view of a hosting platform.
///
/// Every list call returns the complete collection; paging, authentication and
/// transport errors are the implementation's concern.
pub trait Platform {
    async fn list_repositories(&mut self, target: &ScopeTarget) -> Result<Vec<Repository>>;

    async fn repository(&mut self, owner: &str, name: &str) -> Result<Repository>;

    async fn closed_issues(&mut self, owner: &str, repo: &str) -> Result<Vec<Issue>>;

    async fn closed_pull_requests(&mut self, owner: &str, repo: &str) -> Result<Vec<PullRequest>>;

    /// Default-branch commits, optionally bounded by `since`/`until`.
    async fn commits(
        &mut self,
        owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>>;

    /// Entries of one directory; `""` is the repository root.
    async fn contents(&mut self, owner: &str, repo: &str, path: &str)
    -> Result<Vec<ContentEntry>>;
}

impl Platform for GitHubClient {
    async fn list_repositories(&mut self, target: &ScopeTarget) -> Result<Vec<Repository>> {
        match target {
            ScopeTarget::User(login) => self.get_user_repos(login).await,
            ScopeTarget::Organization(org) => self.get_org_repos(org).await,
            ScopeTarget::Team { org, slug } => self.get_team_repos(org, slug).await,
        }
    }

    async fn repository(&mut self, owner: &str, name: &str) -> Result<Repository> {
        self.get_repo(owner, name).await
    }

    async fn closed_issues(&mut self, owner: &str, repo: &str) -> Result<Vec<Issue>> {
        self.get_closed_issues(owner, repo).await
    }

    async fn closed_pull_requests(&mut self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        self.get_closed_pulls(owner, repo).await
    }

    async fn commits(
        &mut self,
        owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>> {
        self.get_commits(owner, repo, since, until).await
    }

    async fn contents(
        &mut self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>> {
        self.get_contents(owner, repo, path).await
    }
}
