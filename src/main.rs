//! AirPulse server binary.
//!
//! Usage: `airpulse [config.toml]`. Without an argument the path is taken
//! from `AIRPULSE_CONFIG`; without either, built-in defaults are used.

use airpulse::config::{config_path, load_config, AppConfig};
use airpulse::lifecycle;
use airpulse::observability::{init_logging, init_metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path(std::env::args().nth(1));
    let config = match &path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "airpulse starting");

    match &path {
        Some(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        None => tracing::info!("No configuration file given; using defaults"),
    }
    tracing::info!(
        bind_address = %config.server.bind_address,
        node_url = %config.ledger.node_url,
        storage = ?config.storage.backend,
        "Configuration summary"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
