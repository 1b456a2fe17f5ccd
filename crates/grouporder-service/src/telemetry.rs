//! Tracing setup.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServiceConfig};

/// Installs the global `tracing` subscriber using `config.log_filter`.
///
/// `RUST_LOG`, when set, takes precedence over the configured filter.
/// Fails if a subscriber is already installed.
pub fn init_tracing(config: &ServiceConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|_| ConfigError::InvalidValue("GROUPORDER_LOG".to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ConfigError::Telemetry(e.to_string()))?;

    info!(filter = %config.log_filter, "Tracing initialized");
    Ok(())
}
