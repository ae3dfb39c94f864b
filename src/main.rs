// scope-metrics entry point.
// Loads configuration, builds a scope over the GitHub API, and prints one metric.

use scope_metrics::config::Config;
use scope_metrics::github::GitHubClient;
use scope_metrics::{Result, Scope, logging, metrics};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::load()?;
    let client = GitHubClient::with_base_url(&config.token, &config.api_base)?;
    let mut scope = Scope::new(client, config.target.clone());

    info!(
        scope = %config.target,
        repo = %config.repo,
        metric = %config.metric,
        "computing metric"
    );

    let output = metrics::report(config.metric, &mut scope, &config.repo, config.language).await?;
    println!("{}", output);

    let rate_limit = scope.platform().rate_limit();
    info!(
        remaining = rate_limit.remaining,
        limit = rate_limit.limit,
        "GitHub rate limit"
    );

    Ok(())
}
