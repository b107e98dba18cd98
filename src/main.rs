//! Gatehouse Server: RBAC admin backend.
//!
//! Main entry point that loads configuration, installs logging and runs the
//! HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use gatehouse_core::config::{AppConfig, LogFormat};
use gatehouse_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = gatehouse_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `GATEHOUSE_ENV` overlay and
/// `GATEHOUSE__*` variables. `GATEHOUSE_CONFIG` points at a single file instead.
fn load_configuration() -> Result<AppConfig, AppError> {
    if let Ok(path) = std::env::var("GATEHOUSE_CONFIG") {
        return AppConfig::load_file(&path);
    }
    let env = std::env::var("GATEHOUSE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
