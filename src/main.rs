//! users-api entry point.
//!
//! Serves `GET /users` over HTTP, opening one TLS-verified MySQL connection
//! per request.
//!
//! Features:
//! - `.env` loading (overrides the process environment)
//! - Graceful shutdown on SIGTERM, SIGINT and SIGHUP

use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};
use users_api::config::load_env_file;
use users_api::shutdown::{install_signal_handlers, new_shutdown_controller};
use users_api::telemetry::{init_logging, LogFormat};
use users_api::{start_http_server, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before logging so RUST_LOG and LOG_FORMAT can come from it
    let env_file = Path::new(".env");
    let env_loaded = load_env_file(env_file)?;

    init_logging(LogFormat::from_env());

    info!("users-api v{} starting...", env!("CARGO_PKG_VERSION"));
    if env_loaded {
        info!("Loaded environment from {}", env_file.display());
    }

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        "Database: {} (database '{}', user '{}')",
        config.database.address(),
        config.database.database,
        config.database.user
    );

    if !config.database.ssl_ca.is_file() {
        warn!(
            "SSL_CA file {} does not exist; every connection attempt will fail",
            config.database.ssl_ca.display()
        );
    }

    let shutdown_controller = new_shutdown_controller();
    install_signal_handlers(shutdown_controller.clone());

    let state = AppState::from_config(&config.database);
    start_http_server(state, config.http, shutdown_controller.signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}
