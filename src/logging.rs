// Tracing setup. Logs go to stderr so stdout carries only the metric.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "scope_metrics=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
