// Runtime configuration.
// Merges an optional TOML file, a `.env` file, and environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::error::{MetricsError, Result};
use crate::github::client::GITHUB_API_BASE;
use crate::metrics::Metric;
use crate::platform::{ScopeKind, ScopeTarget};
use crate::scope::Language;

const DEFAULT_SCOPE: &str = "charliermarsh";
const DEFAULT_REPO: &str = "ruff";

const ENV_TOKEN: &str = "GITHUB_TOKEN";
const ENV_SCOPE: &str = "SCOPE_METRICS_SCOPE";
const ENV_KIND: &str = "SCOPE_METRICS_KIND";
const ENV_TEAM: &str = "SCOPE_METRICS_TEAM";
const ENV_REPO: &str = "SCOPE_METRICS_REPO";
const ENV_METRIC: &str = "SCOPE_METRICS_METRIC";
const ENV_LANGUAGE: &str = "SCOPE_METRICS_LANGUAGE";
const ENV_API_BASE: &str = "SCOPE_METRICS_API_BASE";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub scope: Option<String>,
    pub kind: Option<String>,
    pub team: Option<String>,
    pub repo: Option<String>,
    pub metric: Option<String>,
    pub language: Option<String>,
    pub api_base: Option<String>,
}

impl FileConfig {
    /// Read a config file, treating a missing file as empty.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub target: ScopeTarget,
    pub repo: String,
    pub metric: Metric,
    /// Restricts `language-file-counts` to one bucket.
    pub language: Option<Language>,
    pub api_base: String,
}

impl Config {
    /// Default config file location (`~/.config/scope-metrics/config.toml` on Linux).
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "scope-metrics").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `.env`, the default config file, and the process environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }

        let file = match Self::path() {
            Some(path) => FileConfig::read(&path)?,
            None => FileConfig::default(),
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve settings; environment values win over file values.
    pub fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = env(ENV_TOKEN)
            .filter(|token| !token.is_empty())
            .ok_or(MetricsError::MissingToken)?;

        let scope = env(ENV_SCOPE)
            .or(file.scope)
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        let kind = match env(ENV_KIND).or(file.kind) {
            Some(kind) => kind.parse::<ScopeKind>()?,
            None => ScopeKind::default(),
        };
        let target = match kind {
            ScopeKind::User => ScopeTarget::User(scope),
            ScopeKind::Organization => ScopeTarget::Organization(scope),
            ScopeKind::Team => {
                let slug = env(ENV_TEAM).or(file.team).ok_or_else(|| {
                    MetricsError::Other(format!("team scope requires {}", ENV_TEAM))
                })?;
                ScopeTarget::Team { org: scope, slug }
            }
        };

        let metric = match env(ENV_METRIC).or(file.metric) {
            Some(metric) => metric.parse::<Metric>()?,
            None => Metric::default(),
        };
        let language = env(ENV_LANGUAGE)
            .or(file.language)
            .map(|tag| tag.parse::<Language>())
            .transpose()?;

        Ok(Self {
            token,
            target,
            repo: env(ENV_REPO)
                .or(file.repo)
                .unwrap_or_else(|| DEFAULT_REPO.to_string()),
            metric,
            language,
            api_base: env(ENV_API_BASE)
                .or(file.api_base)
                .unwrap_or_else(|| GITHUB_API_BASE.to_string()),
        })
    }
}
