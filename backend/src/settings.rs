//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ORGCHART_*` environment variables and an
//! optional configuration file, in increasing precedence order as defined by
//! `ortho_config`.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_DB_CONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_DB_CONNECT_RETRY_SECS: u64 = 5;
const DEFAULT_CLOSURE_TIMEOUT_MS: u64 = 5_000;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a socket address.
    #[error("invalid bind address {value:?}: {reason}")]
    InvalidBindAddr { value: String, reason: String },
}

/// Runtime configuration for the organisation chart service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORGCHART")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    #[ortho_config(default = DEFAULT_BIND_ADDR.to_owned())]
    pub bind_addr: String,
    /// PostgreSQL connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_pool_size: Option<u32>,
    /// Attempts made to reach the database at startup.
    pub db_connect_attempts: Option<u32>,
    /// Pause between startup connection attempts, in seconds.
    pub db_connect_retry_secs: Option<u64>,
    /// Budget for a manager closure request, in milliseconds.
    pub closure_timeout_ms: Option<u64>,
}

impl AppSettings {
    /// Parsed bind address; blank falls back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let trimmed = self.bind_addr.trim();
        let raw = if trimmed.is_empty() {
            DEFAULT_BIND_ADDR
        } else {
            trimmed
        };
        raw.parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                reason: err.to_string(),
            })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size cap, defaulting to 10; at least one.
    pub fn db_max_pool_size(&self) -> u32 {
        self.db_max_pool_size
            .unwrap_or(DEFAULT_DB_MAX_POOL_SIZE)
            .max(1)
    }

    /// Startup connection attempts; at least one.
    pub fn db_connect_attempts(&self) -> u32 {
        self.db_connect_attempts
            .unwrap_or(DEFAULT_DB_CONNECT_ATTEMPTS)
            .max(1)
    }

    /// Pause between startup connection attempts, defaulting to 5 seconds.
    pub fn db_connect_retry(&self) -> Duration {
        Duration::from_secs(
            self.db_connect_retry_secs
                .unwrap_or(DEFAULT_DB_CONNECT_RETRY_SECS),
        )
    }

    /// Manager closure budget, defaulting to 5000 milliseconds.
    pub fn closure_timeout(&self) -> Duration {
        Duration::from_millis(self.closure_timeout_ms.unwrap_or(DEFAULT_CLOSURE_TIMEOUT_MS))
    }
}
