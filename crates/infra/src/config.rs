//! Configuration loading and representation.
//!
//! Everything comes from environment variables; `from_lookup` exists so tests
//! can feed a map instead of mutating the process environment.

use thiserror::Error;

pub use catalog_observability::LogFormat;

pub const BIND_ADDR_VAR: &str = "CATALOG_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "CATALOG_DB_MAX_CONNECTIONS";
pub const LOG_FORMAT_VAR: &str = "CATALOG_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer (got '{value}')")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be 'json' or 'pretty' (got '{value}')")]
    InvalidLogFormat { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// `None` selects the in-memory product store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get(BIND_ADDR_VAR) {
            config.bind_addr = addr;
        }

        config.database_url = get(DATABASE_URL_VAR);

        if let Some(raw) = get(MAX_CONNECTIONS_VAR) {
            config.max_connections = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: MAX_CONNECTIONS_VAR,
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = get(LOG_FORMAT_VAR) {
            config.log_format = raw.parse().map_err(|_| ConfigError::InvalidLogFormat {
                var: LOG_FORMAT_VAR,
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}
