// Engineering metrics derived from a scope's cached data.
// Each metric has a pure core over already-fetched lists so it can be checked without a platform.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};

use crate::cache::Clock;
use crate::error::{MetricsError, Result};
use crate::github::Commit;
use crate::platform::Platform;
use crate::scope::{Language, Lifecycle, Scope};

/// Trailing window for review and cycle time.
pub const DURATION_WINDOW_MONTHS: u32 = 2;

/// Rolling windows for commit counts, in months.
pub const COMMIT_WINDOWS_MONTHS: [u32; 4] = [1, 3, 6, 12];

/// Metric selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    CodeReviewTime,
    CycleTime,
    TypedPercentage,
    CommitCounts,
    LanguageFileCounts,
    Repositories,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::CodeReviewTime => "code-review-time",
            Metric::CycleTime => "cycle-time",
            Metric::TypedPercentage => "typed-percentage",
            Metric::CommitCounts => "commit-counts",
            Metric::LanguageFileCounts => "language-file-counts",
            Metric::Repositories => "repositories",
        }
    }

    /// Whether the metric is computed for a single repository.
    pub fn needs_repository(&self) -> bool {
        !matches!(self, Metric::Repositories)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "code-review-time" => Ok(Metric::CodeReviewTime),
            "cycle-time" => Ok(Metric::CycleTime),
            "typed-percentage" => Ok(Metric::TypedPercentage),
            "commit-counts" => Ok(Metric::CommitCounts),
            "language-file-counts" => Ok(Metric::LanguageFileCounts),
            "repositories" => Ok(Metric::Repositories),
            _ => Err(MetricsError::InvalidMetric(s.to_string())),
        }
    }
}

/// Minutes in a duration, rounded to three decimals.
pub fn minutes(delta: TimeDelta) -> f64 {
    round_to(delta.num_seconds() as f64 / 60.0, 3)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `(title, minutes to close)` for each closed item.
pub fn durations_in_minutes<T: Lifecycle>(items: &[&T]) -> Vec<(String, f64)> {
    items
        .iter()
        .filter_map(|item| {
            item.time_taken()
                .map(|taken| (item.title().to_string(), minutes(taken)))
        })
        .collect()
}

fn window_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Review time of pull requests opened and closed in the trailing two months.
pub async fn code_review_time<P: Platform, C: Clock>(
    scope: &mut Scope<P, C>,
    repo: &str,
) -> Result<Vec<(String, f64)>> {
    let after = scope.now();
    let before = window_start(after, DURATION_WINDOW_MONTHS);
    let pulls = scope.pull_requests_by_time(repo, before, after).await?;
    Ok(durations_in_minutes(&pulls))
}

/// Cycle time of issues opened and closed in the trailing two months.
pub async fn cycle_time<P: Platform, C: Clock>(
    scope: &mut Scope<P, C>,
    repo: &str,
) -> Result<Vec<(String, f64)>> {
    let after = scope.now();
    let before = window_start(after, DURATION_WINDOW_MONTHS);
    let issues = scope.issues_by_time(repo, before, after).await?;
    Ok(durations_in_minutes(&issues))
}

/// Share of typed files among typed and untyped files, in percent.
pub fn percentage(typed: usize, untyped: usize) -> Result<f64> {
    let total = typed + untyped;
    if total == 0 {
        return Err(MetricsError::DivisionByZero);
    }
    Ok(round_to(typed as f64 / total as f64 * 100.0, 2))
}

pub async fn typed_percentage<P: Platform, C: Clock>(
    scope: &mut Scope<P, C>,
    repo: &str,
) -> Result<f64> {
    let typed = scope.typed_files(repo).await?.len();
    let untyped = scope.untyped_files(repo).await?.len();
    percentage(typed, untyped)
}

/// Commits landed in each rolling window ending at `now`.
pub fn count_commits_in_windows(commits: &[Commit], now: DateTime<Utc>) -> Vec<(u32, usize)> {
    COMMIT_WINDOWS_MONTHS
        .iter()
        .map(|&months| {
            let since = window_start(now, months);
            let count = commits
                .iter()
                .filter_map(Commit::date)
                .filter(|date| *date >= since && *date <= now)
                .count();
            (months, count)
        })
        .collect()
}

/// Default-branch commit counts over the last 1, 3, 6 and 12 months.
pub async fn commit_counts<P: Platform, C: Clock>(
    scope: &mut Scope<P, C>,
    repo: &str,
) -> Result<Vec<(u32, usize)>> {
    let now = scope.now();
    let commits = scope.all_commits(repo).await?;
    Ok(count_commits_in_windows(commits, now))
}

/// Number of files in every classification bucket.
pub async fn language_file_counts<P: Platform, C: Clock>(
    scope: &mut Scope<P, C>,
    repo: &str,
) -> Result<Vec<(Language, usize)>> {
    file_counts(scope, repo, &Language::ALL).await
}

/// Number of files in each of `languages`.
pub async fn file_counts<P: Platform, C: Clock>(
    scope: &mut Scope<P, C>,
    repo: &str,
    languages: &[Language],
) -> Result<Vec<(Language, usize)>> {
    let mut counts = Vec::with_capacity(languages.len());
    for &language in languages {
        let count = scope.files_by_language(repo, language).await?.len();
        counts.push((language, count));
    }
    Ok(counts)
}

pub async fn repository_names<P: Platform, C: Clock>(
    scope: &mut Scope<P, C>,
) -> Result<Vec<String>> {
    scope.repository_names().await
}

/// Compute `metric` and render it for standard output.
///
/// `language` narrows `LanguageFileCounts` to a single bucket.
pub async fn report<P: Platform, C: Clock>(
    metric: Metric,
    scope: &mut Scope<P, C>,
    repo: &str,
    language: Option<Language>,
) -> Result<String> {
    let rendered = match metric {
        Metric::CodeReviewTime => format!("{:?}", unzip(code_review_time(scope, repo).await?)),
        Metric::CycleTime => format!("{:?}", unzip(cycle_time(scope, repo).await?)),
        Metric::TypedPercentage => format!("{:?}", typed_percentage(scope, repo).await?),
        Metric::CommitCounts => format!("{:?}", commit_counts(scope, repo).await?),
        Metric::LanguageFileCounts => {
            let counts = match language {
                Some(language) => file_counts(scope, repo, &[language]).await?,
                None => language_file_counts(scope, repo).await?,
            };
            let counts: Vec<(String, usize)> = counts
                .into_iter()
                .map(|(language, count)| (language.to_string(), count))
                .collect();
            format!("{:?}", counts)
        }
        Metric::Repositories => format!("{:?}", repository_names(scope).await?),
    };
    Ok(rendered)
}

/// Split `(label, value)` pairs into parallel label and value series.
fn unzip(pairs: Vec<(String, f64)>) -> (Vec<String>, Vec<f64>) {
    pairs.into_iter().unzip()
}
