//! Server binary for the modsim agent simulator.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `modsim-config.yaml` (or `$MODSIM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open storage: `PostgreSQL` when a database URL is set, memory otherwise
//! 4. Seed the bundled two-body profile
//! 5. Serve the HTTP API until `Ctrl-C`

mod bootstrap;

use std::sync::Arc;

use anyhow::Context as _;
use modsim_api::AppState;
use modsim_core::config::{LoggingConfig, ModsimConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ModsimConfig::load().context("failed to load configuration")?;

    init_tracing(&config.logging);
    info!(
        host = config.server.host,
        port = config.server.port,
        iterations = config.simulation.iterations,
        database = config.database.url.is_some(),
        "modsim-server starting"
    );

    let storage = bootstrap::open_storage(&config.database)
        .await
        .context("failed to open storage")?;
    info!(backend = storage.kind(), "Storage ready");

    let state = Arc::new(
        AppState::new(storage, config.simulation.iterations)
            .with_cors_origins(config.server.cors_origins.clone()),
    );

    if config.server.seed_default_profile {
        bootstrap::seed_default_profile(&state)
            .await
            .context("failed to seed the default profile")?;
    }

    modsim_api::start_server(&config.server, state)
        .await
        .context("server failed")?;

    info!("modsim-server shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
