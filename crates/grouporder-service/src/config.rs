//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                     | Default              |
//! |------------------------------|----------------------|
//! | `GROUPORDER_DATABASE_PATH`   | `./grouporder.db`    |
//! | `GROUPORDER_MAX_CONNECTIONS` | `5`                  |
//! | `GROUPORDER_LOG`             | `info`               |

use grouporder_db::DbConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// `tracing` filter directive, e.g. `info,grouporder_db=debug`
    pub log_filter: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = ServiceConfig {
            database_path: lookup("GROUPORDER_DATABASE_PATH")
                .unwrap_or_else(|| "./grouporder.db".to_string())
                .into(),

            max_connections: lookup("GROUPORDER_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GROUPORDER_MAX_CONNECTIONS".to_string()))?,

            log_filter: lookup("GROUPORDER_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "GROUPORDER_MAX_CONNECTIONS".to_string(),
            ));
        }

        if EnvFilter::try_new(&config.log_filter).is_err() {
            return Err(ConfigError::InvalidValue("GROUPORDER_LOG".to_string()));
        }

        if config.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired(
                "GROUPORDER_DATABASE_PATH".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database pool configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to install tracing subscriber: {0}")]
    Telemetry(String),
}
