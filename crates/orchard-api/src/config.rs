//! Orchard API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use orchard_core::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use orchard_db::DbConfig;

/// Orchard API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pooled connections
    pub db_max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub db_timeout_secs: u64,

    /// Page size when a listing does not ask for one
    pub default_page_limit: u32,

    /// Largest page a listing may request
    pub max_page_limit: u32,

    /// Failures reported back from a bulk insert
    pub bulk_error_sample: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            database_path: PathBuf::from("./orchard.db"),
            db_max_connections: 5,
            db_timeout_secs: 30,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: MAX_PAGE_LIMIT,
            bulk_error_sample: 3,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            database_path: lookup("ORCHARD_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: parse_var(&lookup, "ORCHARD_DB_MAX_CONNECTIONS")?
                .unwrap_or(defaults.db_max_connections),

            db_timeout_secs: parse_var(&lookup, "ORCHARD_DB_TIMEOUT_SECS")?
                .unwrap_or(defaults.db_timeout_secs),

            default_page_limit: parse_var(&lookup, "ORCHARD_DEFAULT_PAGE_LIMIT")?
                .unwrap_or(defaults.default_page_limit),

            max_page_limit: parse_var(&lookup, "ORCHARD_MAX_PAGE_LIMIT")?
                .unwrap_or(defaults.max_page_limit),

            bulk_error_sample: parse_var(&lookup, "ORCHARD_BULK_ERROR_SAMPLE")?
                .unwrap_or(defaults.bulk_error_sample),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("ORCHARD_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.default_page_limit == 0 || config.default_page_limit > config.max_page_limit {
            return Err(ConfigError::InvalidValue("ORCHARD_DEFAULT_PAGE_LIMIT".to_string()));
        }

        Ok(config)
    }

    /// Pool configuration for [`orchard_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .connect_timeout(Duration::from_secs(self.db_timeout_secs))
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        None => Ok(None),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
