// Error types for scope-metrics.
// Covers GitHub API failures, configuration problems, and metric preconditions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Missing GITHUB_TOKEN environment variable")]
    MissingToken,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unsupported language '{0}', expected one of: py, js, java, c, cpp, typed, untyped")]
    InvalidLanguage(String),

    #[error(
        "Unknown metric '{0}', expected one of: code-review-time, cycle-time, typed-percentage, commit-counts, language-file-counts, repositories"
    )]
    InvalidMetric(String),

    #[error("Unknown scope kind '{0}', expected one of: user, org, team")]
    InvalidScopeKind(String),

    #[error("No cache entry recorded for '{0}'")]
    NotCached(String),

    #[error("Cannot compute a percentage: no typed or untyped files found")]
    DivisionByZero,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
