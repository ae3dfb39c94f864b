// GitHub API endpoint functions.
// Provides typed methods for fetching data from the GitHub REST API.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{Commit, ContentEntry, Issue, PullRequest, Repository};

impl GitHubClient {
    /// Get public repositories owned by a user, forks included.
    pub async fn get_user_repos(&mut self, user: &str) -> Result<Vec<Repository>> {
        let params = [("type", "owner".to_string())];
        self.get_all_pages(&format!("/users/{}/repos", user), &params)
            .await
    }

    /// Get repositories for an organization.
    pub async fn get_org_repos(&mut self, org: &str) -> Result<Vec<Repository>> {
        let params = [("type", "all".to_string())];
        self.get_all_pages(&format!("/orgs/{}/repos", org), &params)
            .await
    }

    /// Get repositories a team has access to.
    pub async fn get_team_repos(&mut self, org: &str, team_slug: &str) -> Result<Vec<Repository>> {
        self.get_all_pages(&format!("/orgs/{}/teams/{}/repos", org, team_slug), &[])
            .await
    }

    /// Get a specific repository.
    pub async fn get_repo(&mut self, owner: &str, repo: &str) -> Result<Repository> {
        let response = self.get(&format!("/repos/{}/{}", owner, repo)).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }

    /// Get closed issues for a repository. Pull requests are filtered out.
    pub async fn get_closed_issues(&mut self, owner: &str, repo: &str) -> Result<Vec<Issue>> {
        let params = [("state", "closed".to_string())];
        let issues: Vec<Issue> = self
            .get_all_pages(&format!("/repos/{}/{}/issues", owner, repo), &params)
            .await?;
        Ok(without_pull_requests(issues))
    }

    /// Get closed pull requests for a repository.
    pub async fn get_closed_pulls(&mut self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        let params = [("state", "closed".to_string())];
        self.get_all_pages(&format!("/repos/{}/{}/pulls", owner, repo), &params)
            .await
    }

    /// Get commits on the default branch, optionally bounded by `since`/`until`.
    pub async fn get_commits(
        &mut self,
        owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>> {
        let mut params = Vec::new();
        if let Some(since) = since {
            params.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(until) = until {
            params.push(("until", until.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        self.get_all_pages(&format!("/repos/{}/{}/commits", owner, repo), &params)
            .await
    }

    /// List a directory in a repository. An empty path lists the root.
    pub async fn get_contents(
        &mut self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>> {
        let url = self.contents_url(owner, repo, path)?;
        let response = self.get_url(url).await?;
        let entries: Vec<ContentEntry> = response.json().await?;
        Ok(entries)
    }

    /// Contents URL for `path`. Directory names may hold `#`, `?` or `%`,
    /// so each component is encoded on its own.
    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Result<Url> {
        let components = path.split('/').filter(|part| !part.is_empty());
        self.url_for(["repos", owner, repo, "contents"].into_iter().chain(components))
    }
}

/// The issues endpoint also lists pull requests; keep real issues only.
fn without_pull_requests(issues: Vec<Issue>) -> Vec<Issue> {
    issues
        .into_iter()
        .filter(|issue| !issue.is_pull_request())
        .collect()
}
