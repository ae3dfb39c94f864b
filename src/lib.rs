// scope-metrics: engineering metrics for a GitHub user, organization, or team.
// Fetched data is cached in memory per repository and refetched after 24 hours.

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod metrics;
pub mod platform;
pub mod scope;

#[cfg(test)]
mod testing;

pub use error::{MetricsError, Result};
pub use platform::{Platform, ScopeTarget};
pub use scope::Scope;
