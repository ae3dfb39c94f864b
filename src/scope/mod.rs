// Scope: the user, organization, or team being measured.
// Owns the per-repository caches and refetches any entry older than the TTL.

pub mod classify;
pub mod language;
pub mod lifecycle;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::{CachedData, Clock, DEFAULT_TTL, SystemClock, TtlCache};
use crate::error::Result;
use crate::github::{Commit, ContentEntry, Issue, PullRequest, Repository};
use crate::platform::{Platform, ScopeTarget};

pub use language::Language;
pub use lifecycle::Lifecycle;

/// Cached view of one scope on the hosting platform.
///
/// Every getter serves its cached value while it is younger than
/// [`DEFAULT_TTL`] and otherwise refetches the whole collection, replacing
/// what was stored. Only closed issues and pull requests are ever fetched.
pub struct Scope<P, C = SystemClock> {
    target: ScopeTarget,
    platform: P,
    clock: C,
    repos: Option<CachedData<Vec<Repository>>>,
    issues: TtlCache<String, Vec<Issue>>,
    pulls: TtlCache<String, Vec<PullRequest>>,
    commits: TtlCache<String, Vec<Commit>>,
    files: HashMap<Language, TtlCache<String, Vec<ContentEntry>>>,
}

impl<P: Platform> Scope<P, SystemClock> {
    pub fn new(platform: P, target: ScopeTarget) -> Self {
        Self::with_clock(platform, target, SystemClock)
    }
}

impl<P: Platform, C: Clock> Scope<P, C> {
    pub fn with_clock(platform: P, target: ScopeTarget, clock: C) -> Self {
        Self {
            target,
            platform,
            clock,
            repos: None,
            issues: TtlCache::default(),
            pulls: TtlCache::default(),
            commits: TtlCache::default(),
            files: Language::ALL
                .into_iter()
                .map(|language| (language, TtlCache::default()))
                .collect(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// All repositories of the scope, forks included.
    pub async fn repositories(&mut self) -> Result<&[Repository]> {
        let now = self.clock.now();
        let fresh = self
            .repos
            .as_ref()
            .is_some_and(|cached| cached.is_valid(DEFAULT_TTL, now));

        if fresh {
            debug!(scope = %self.target, "repository list cache hit");
        } else {
            let repos = self.platform.list_repositories(&self.target).await?;
            info!(scope = %self.target, count = repos.len(), "refreshed repository list");
            self.repos = Some(CachedData::new(repos, now));
        }

        Ok(self
            .repos
            .as_ref()
            .map(|cached| cached.data.as_slice())
            .unwrap_or_default())
    }

    /// Look up a single repository by name. Never cached.
    pub async fn repository(&mut self, name: &str) -> Result<Repository> {
        self.platform.repository(self.target.owner(), name).await
    }

    /// Closed issues of `repo`.
    pub async fn issues(&mut self, repo: &str) -> Result<&[Issue]> {
        let owner = self.target.owner().to_string();
        self.issues_of(&owner, repo).await
    }

    /// Closed pull requests of `repo`.
    pub async fn pull_requests(&mut self, repo: &str) -> Result<&[PullRequest]> {
        let owner = self.target.owner().to_string();
        self.pull_requests_of(&owner, repo).await
    }

    /// Closed issues of every repository in the scope, keyed by repository name.
    pub async fn all_issues(&mut self) -> Result<HashMap<String, &[Issue]>> {
        let listed = self.listed_repositories().await?;
        for (owner, name) in &listed {
            self.issues_of(owner, name).await?;
        }

        listed
            .into_iter()
            .map(|(_, name)| {
                self.issues
                    .value(&name)
                    .map(|issues| (name, issues.as_slice()))
            })
            .collect()
    }

    /// Closed pull requests of every repository in the scope, keyed by repository name.
    pub async fn all_pull_requests(&mut self) -> Result<HashMap<String, &[PullRequest]>> {
        let listed = self.listed_repositories().await?;
        for (owner, name) in &listed {
            self.pull_requests_of(owner, name).await?;
        }

        listed
            .into_iter()
            .map(|(_, name)| {
                self.pulls
                    .value(&name)
                    .map(|pulls| (name, pulls.as_slice()))
            })
            .collect()
    }

    /// `(owner login, name)` of every listed repository.
    async fn listed_repositories(&mut self) -> Result<Vec<(String, String)>> {
        Ok(self
            .repositories()
            .await?
            .iter()
            .map(|repo| (repo.owner.login.clone(), repo.name.clone()))
            .collect())
    }

    async fn issues_of(&mut self, owner: &str, repo: &str) -> Result<&[Issue]> {
        let key = repo.to_string();
        let now = self.clock.now();

        if self.issues.is_fresh(&key, now) {
            debug!(repo, "issues cache hit");
        } else {
            let issues = self.platform.closed_issues(owner, repo).await?;
            info!(owner, repo, count = issues.len(), "refreshed closed issues");
            self.issues.insert(key.clone(), issues, now);
        }

        self.issues.value(&key).map(Vec::as_slice)
    }

    async fn pull_requests_of(&mut self, owner: &str, repo: &str) -> Result<&[PullRequest]> {
        let key = repo.to_string();
        let now = self.clock.now();

        if self.pulls.is_fresh(&key, now) {
            debug!(repo, "pull requests cache hit");
        } else {
            let pulls = self.platform.closed_pull_requests(owner, repo).await?;
            info!(owner, repo, count = pulls.len(), "refreshed closed pull requests");
            self.pulls.insert(key.clone(), pulls, now);
        }

        self.pulls.value(&key).map(Vec::as_slice)
    }

    /// Closed issues of `repo` opened at or after `before` and closed at or before `after`.
    pub async fn issues_by_time(
        &mut self,
        repo: &str,
        before: DateTime<Utc>,
        after: DateTime<Utc>,
    ) -> Result<Vec<&Issue>> {
        let issues = self.issues(repo).await?;
        Ok(issues
            .iter()
            .filter(|issue| issue.within(before, after))
            .collect())
    }

    /// Closed pull requests of `repo` opened at or after `before` and closed at or before `after`.
    pub async fn pull_requests_by_time(
        &mut self,
        repo: &str,
        before: DateTime<Utc>,
        after: DateTime<Utc>,
    ) -> Result<Vec<&PullRequest>> {
        let pulls = self.pull_requests(repo).await?;
        Ok(pulls.iter().filter(|pr| pr.within(before, after)).collect())
    }

    /// Default-branch commits between `since` and `until`, always fetched fresh.
    pub async fn commits_by_time(
        &mut self,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Commit>> {
        self.platform
            .commits(self.target.owner(), repo, Some(since), Some(until))
            .await
    }

    /// Entire default-branch history of `repo`.
    pub async fn all_commits(&mut self, repo: &str) -> Result<&[Commit]> {
        let key = repo.to_string();
        let now = self.clock.now();

        if self.commits.is_fresh(&key, now) {
            debug!(repo, "commits cache hit");
        } else {
            let commits = self
                .platform
                .commits(self.target.owner(), repo, None, None)
                .await?;
            info!(repo, count = commits.len(), "refreshed commit history");
            self.commits.insert(key.clone(), commits, now);
        }

        self.commits.value(&key).map(Vec::as_slice)
    }

    /// Files of `repo` classified into `language`.
    pub async fn files_by_language(
        &mut self,
        repo: &str,
        language: Language,
    ) -> Result<&[ContentEntry]> {
        let key = repo.to_string();
        let now = self.clock.now();
        let cache = self.files.entry(language).or_default();

        if cache.is_fresh(&key, now) {
            debug!(repo, %language, "file cache hit");
        } else {
            let files = classify::collect_files(
                &mut self.platform,
                self.target.owner(),
                repo,
                language.extensions(),
            )
            .await?;
            cache.insert(key.clone(), files, now);
        }

        cache.value(&key).map(Vec::as_slice)
    }

    pub async fn python_files(&mut self, repo: &str) -> Result<&[ContentEntry]> {
        self.files_by_language(repo, Language::Python).await
    }

    pub async fn javascript_files(&mut self, repo: &str) -> Result<&[ContentEntry]> {
        self.files_by_language(repo, Language::JavaScript).await
    }

    pub async fn java_files(&mut self, repo: &str) -> Result<&[ContentEntry]> {
        self.files_by_language(repo, Language::Java).await
    }

    pub async fn c_files(&mut self, repo: &str) -> Result<&[ContentEntry]> {
        self.files_by_language(repo, Language::C).await
    }

    pub async fn cpp_files(&mut self, repo: &str) -> Result<&[ContentEntry]> {
        self.files_by_language(repo, Language::Cpp).await
    }

    pub async fn typed_files(&mut self, repo: &str) -> Result<&[ContentEntry]> {
        self.files_by_language(repo, Language::Typed).await
    }

    pub async fn untyped_files(&mut self, repo: &str) -> Result<&[ContentEntry]> {
        self.files_by_language(repo, Language::Untyped).await
    }

    /// Names of every repository in the scope.
    pub async fn repository_names(&mut self) -> Result<Vec<String>> {
        Ok(self
            .repositories()
            .await?
            .iter()
            .map(|repo| repo.name.clone())
            .collect())
    }

    /// When the cached entry of `language` files for `repo` was last refreshed.
    pub fn files_cached_at(&self, repo: &str, language: Language) -> Option<DateTime<Utc>> {
        self.files
            .get(&language)
            .and_then(|cache| cache.cached_at(&repo.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    use crate::error::MetricsError;
    use crate::testing::{
        FakePlatform, ManualClock, at, commit, file, issue, pull, repository,
    };

    const REPO: &str = "ruff";

    fn scope_with(platform: FakePlatform) -> (Scope<FakePlatform, ManualClock>, ManualClock) {
        let clock = ManualClock::new(at("2024-06-01T12:00:00Z"));
        let scope = Scope::with_clock(
            platform,
            ScopeTarget::User("charliermarsh".into()),
            clock.clone(),
        );
        (scope, clock)
    }

    fn platform_with_issues() -> FakePlatform {
        let mut platform = FakePlatform::default();
        platform.issues.insert(
            REPO.into(),
            vec![issue(1, "first", at("2024-05-01T00:00:00Z"), Some(at("2024-05-02T00:00:00Z")))],
        );
        platform
    }

    #[tokio::test]
    async fn test_served_from_cache_within_ttl() {
        let (mut scope, clock) = scope_with(platform_with_issues());

        scope.issues(REPO).await.unwrap();
        clock.advance(TimeDelta::hours(24) - TimeDelta::seconds(1));
        scope.issues(REPO).await.unwrap();

        assert_eq!(scope.platform().calls("closed_issues"), 1);
    }

    #[tokio::test]
    async fn test_refetched_at_ttl() {
        let (mut scope, clock) = scope_with(platform_with_issues());

        scope.issues(REPO).await.unwrap();
        clock.advance(TimeDelta::hours(24));
        scope.issues(REPO).await.unwrap();

        assert_eq!(scope.platform().calls("closed_issues"), 2);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_instead_of_merging() {
        let (mut scope, clock) = scope_with(platform_with_issues());
        assert_eq!(scope.issues(REPO).await.unwrap().len(), 1);

        let replacement = vec![
            issue(2, "second", at("2024-05-03T00:00:00Z"), Some(at("2024-05-04T00:00:00Z"))),
            issue(3, "third", at("2024-05-05T00:00:00Z"), Some(at("2024-05-06T00:00:00Z"))),
        ];
        scope
            .platform_mut()
            .issues
            .insert(REPO.into(), replacement.clone());

        // Still fresh: the old list is served unchanged.
        assert_eq!(scope.issues(REPO).await.unwrap().len(), 1);

        clock.advance(TimeDelta::days(2));
        assert_eq!(scope.issues(REPO).await.unwrap(), replacement.as_slice());
    }

    #[tokio::test]
    async fn test_caches_are_keyed_per_repository() {
        let mut platform = platform_with_issues();
        platform.issues.insert("other".into(), vec![]);
        let (mut scope, _clock) = scope_with(platform);

        scope.issues(REPO).await.unwrap();
        scope.issues("other").await.unwrap();
        scope.issues(REPO).await.unwrap();

        assert_eq!(scope.platform().calls("closed_issues"), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_entry() {
        let (mut scope, _clock) = scope_with(FakePlatform::default());

        let err = scope.pull_requests("missing").await.unwrap_err();
        assert!(matches!(err, MetricsError::NotFound(_)));
        assert!(scope.pulls.is_empty());
    }

    #[tokio::test]
    async fn test_time_window_keeps_only_closed_items_inside_bounds() {
        let mut platform = FakePlatform::default();
        platform.pulls.insert(
            REPO.into(),
            vec![
                pull(1, "inside", at("2024-04-10T00:00:00Z"), Some(at("2024-04-11T00:00:00Z"))),
                pull(2, "opened early", at("2024-03-01T00:00:00Z"), Some(at("2024-04-11T00:00:00Z"))),
                pull(3, "closed late", at("2024-04-10T00:00:00Z"), Some(at("2024-06-01T00:00:00Z"))),
                pull(4, "never closed", at("2024-04-10T00:00:00Z"), None),
                pull(5, "on the edges", at("2024-04-01T00:00:00Z"), Some(at("2024-05-01T00:00:00Z"))),
            ],
        );
        let (mut scope, _clock) = scope_with(platform);

        let found = scope
            .pull_requests_by_time(REPO, at("2024-04-01T00:00:00Z"), at("2024-05-01T00:00:00Z"))
            .await
            .unwrap();

        let numbers: Vec<u64> = found.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![1, 5]);
    }

    #[tokio::test]
    async fn test_issues_by_time_reuses_cache() {
        let (mut scope, _clock) = scope_with(platform_with_issues());

        let first = scope
            .issues_by_time(REPO, at("2024-01-01T00:00:00Z"), at("2024-12-31T00:00:00Z"))
            .await
            .unwrap()
            .len();
        let second = scope
            .issues_by_time(REPO, at("2024-05-01T12:00:00Z"), at("2024-12-31T00:00:00Z"))
            .await
            .unwrap()
            .len();

        assert_eq!((first, second), (1, 0));
        assert_eq!(scope.platform().calls("closed_issues"), 1);
    }

    #[tokio::test]
    async fn test_repositories_cached() {
        let mut platform = FakePlatform::default();
        platform.repos = vec![repository("ruff"), repository("uv")];
        let (mut scope, clock) = scope_with(platform);

        assert_eq!(scope.repository_names().await.unwrap(), vec!["ruff", "uv"]);
        clock.advance(TimeDelta::hours(12));
        scope.repositories().await.unwrap();
        assert_eq!(scope.platform().calls("list_repositories"), 1);

        clock.advance(TimeDelta::hours(12));
        scope.repositories().await.unwrap();
        assert_eq!(scope.platform().calls("list_repositories"), 2);
    }

    #[tokio::test]
    async fn test_all_issues_covers_every_repository() {
        let mut platform = platform_with_issues();
        platform.repos = vec![repository("ruff"), repository("uv")];
        platform.issues.insert(
            "uv".into(),
            vec![
                issue(8, "a", at("2024-05-01T00:00:00Z"), Some(at("2024-05-02T00:00:00Z"))),
                issue(9, "b", at("2024-05-01T00:00:00Z"), Some(at("2024-05-02T00:00:00Z"))),
            ],
        );
        let (mut scope, _clock) = scope_with(platform);

        let all = scope.all_issues().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["ruff"].len(), 1);
        assert_eq!(all["uv"].len(), 2);

        scope.issues("uv").await.unwrap();
        assert_eq!(scope.platform().calls("closed_issues"), 2);
    }

    #[tokio::test]
    async fn test_all_pull_requests_covers_every_repository() {
        let mut platform = FakePlatform::default();
        platform.repos = vec![repository("ruff")];
        platform.pulls.insert(REPO.into(), vec![]);
        let (mut scope, _clock) = scope_with(platform);

        let all = scope.all_pull_requests().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all["ruff"].is_empty());
    }

    #[tokio::test]
    async fn test_aggregates_fetch_with_listed_owner() {
        let mut transferred = repository("uv");
        transferred.owner.login = "astral-sh".into();
        let mut platform = FakePlatform::default();
        platform.repos = vec![repository("ruff"), transferred];
        platform.issues.insert(REPO.into(), vec![]);
        platform.issues.insert("uv".into(), vec![]);
        platform.pulls.insert(REPO.into(), vec![]);
        platform.pulls.insert("uv".into(), vec![]);
        let (mut scope, _clock) = scope_with(platform);

        scope.all_issues().await.unwrap();
        scope.all_pull_requests().await.unwrap();

        assert_eq!(
            scope.platform().owners,
            vec![
                ("closed_issues", "charliermarsh/ruff".to_string()),
                ("closed_issues", "astral-sh/uv".to_string()),
                ("closed_pull_requests", "charliermarsh/ruff".to_string()),
                ("closed_pull_requests", "astral-sh/uv".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_commits_by_time_is_never_cached() {
        let mut platform = FakePlatform::default();
        platform.commits.insert(
            REPO.into(),
            vec![
                commit("a", at("2024-05-20T00:00:00Z")),
                commit("b", at("2024-03-01T00:00:00Z")),
            ],
        );
        let (mut scope, _clock) = scope_with(platform);
        let since = at("2024-05-01T00:00:00Z");
        let until = at("2024-06-01T00:00:00Z");

        assert_eq!(scope.commits_by_time(REPO, since, until).await.unwrap().len(), 1);
        assert_eq!(scope.commits_by_time(REPO, since, until).await.unwrap().len(), 1);
        assert_eq!(scope.platform().calls("commits"), 2);

        assert_eq!(scope.all_commits(REPO).await.unwrap().len(), 2);
        assert_eq!(scope.all_commits(REPO).await.unwrap().len(), 2);
        assert_eq!(scope.platform().calls("commits"), 3);
    }

    #[tokio::test]
    async fn test_file_buckets_cached_independently() {
        let mut platform = FakePlatform::default();
        platform.add_dir(REPO, "", vec![file("lib.py"), file("app.ts"), file("run.js")]);
        let (mut scope, clock) = scope_with(platform);

        assert_eq!(scope.python_files(REPO).await.unwrap().len(), 1);
        assert_eq!(scope.typed_files(REPO).await.unwrap().len(), 1);
        assert_eq!(scope.untyped_files(REPO).await.unwrap().len(), 2);
        assert_eq!(scope.javascript_files(REPO).await.unwrap().len(), 2);
        assert_eq!(scope.platform().calls("contents"), 4);

        scope.python_files(REPO).await.unwrap();
        scope.typed_files(REPO).await.unwrap();
        assert_eq!(scope.platform().calls("contents"), 4);
        assert_eq!(
            scope.files_cached_at(REPO, Language::Python),
            Some(at("2024-06-01T12:00:00Z"))
        );

        clock.advance(TimeDelta::hours(25));
        scope.untyped_files(REPO).await.unwrap();
        assert_eq!(scope.platform().calls("contents"), 5);
        assert_eq!(scope.files_cached_at(REPO, Language::Java), None);
    }

    #[tokio::test]
    async fn test_repository_lookup_uses_scope_owner() {
        let mut platform = FakePlatform::default();
        platform.repos = vec![repository("ruff")];
        let (mut scope, _clock) = scope_with(platform);

        let repo = scope.repository("ruff").await.unwrap();
        assert_eq!(repo.owner.login, "charliermarsh");
        assert!(scope.repository("nope").await.is_err());
    }
}
