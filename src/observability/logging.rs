//! Structured logging.
//!
//! `RUST_LOG` overrides the configured level. JSON output is meant for
//! deployments that ship logs to an aggregator; the pretty format is for
//! local runs.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. A second call is ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let installed = if config.log_json {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init()
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

fn default_directives(level: &str) -> String {
    format!("airpulse={level},tower_http={level}")
}
