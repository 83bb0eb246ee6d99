//! Configuration management and validation.
//!
//! The service reads a single JSON file at startup holding the HTTP bind
//! address and the PostgreSQL account used for loading and querying.

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_BIND_HOST, DEFAULT_MAX_CONNECTIONS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PostgreSQL account settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_name: String,

    /// Pool size shared by the loader and the query endpoint
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl DatabaseConfig {
    /// Build sqlx connection options (TLS disabled)
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.db_name)
            .ssl_mode(PgSslMode::Disable)
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Host the HTTP server binds to; empty means all interfaces
    #[serde(default)]
    pub ws_host: String,

    /// Port the HTTP server binds to
    pub ws_port: u16,

    /// Database account
    pub db_account: DatabaseConfig,
}

impl Config {
    /// Default location: `config.json` in the executable's directory
    pub fn default_config_path() -> Result<PathBuf> {
        let exe = std::env::current_exe()
            .map_err(|e| Error::io("Failed to locate the running executable", e))?;
        let dir = exe
            .parent()
            .ok_or_else(|| Error::configuration("Executable has no parent directory"))?;
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading config file `{}`", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read config file {}", path.display()),
                e,
            )
        })?;

        let config = Self::from_json(&content).map_err(|e| match e {
            Error::ConfigParsing { source, .. } => Error::ConfigParsing {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        debug!(
            "Config loaded: ws={}:{}, db={}@{}:{}/{}",
            config.ws_host,
            config.ws_port,
            config.db_account.username,
            config.db_account.host,
            config.db_account.port,
            config.db_account.db_name
        );
        Ok(config)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|source| Error::ConfigParsing {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ws_port == 0 {
            return Err(Error::configuration("ws_port must be greater than 0"));
        }

        let db = &self.db_account;
        if db.host.trim().is_empty() {
            return Err(Error::configuration("db_account.host must not be empty"));
        }
        if db.port == 0 {
            return Err(Error::configuration("db_account.port must be greater than 0"));
        }
        if db.username.trim().is_empty() {
            return Err(Error::configuration(
                "db_account.username must not be empty",
            ));
        }
        if db.db_name.trim().is_empty() {
            return Err(Error::configuration("db_account.db_name must not be empty"));
        }
        if db.max_connections == 0 {
            return Err(Error::configuration(
                "db_account.max_connections must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Host to bind, substituting all interfaces for an empty value
    pub fn bind_host(&self) -> &str {
        if self.ws_host.trim().is_empty() {
            DEFAULT_BIND_HOST
        } else {
            &self.ws_host
        }
    }

    /// Host shown in example URLs
    pub fn display_host(&self) -> &str {
        if self.ws_host.trim().is_empty() {
            "localhost"
        } else {
            &self.ws_host
        }
    }
}
