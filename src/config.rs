//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables. Command-line flags are applied last by the binary.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::tokens::TokenPolicy;

/// Config file read when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "energy_war.toml";

/// Environment variable overriding the database path.
pub const ENV_DB_URI: &str = "DB_URI";
/// Environment variable overriding the bind host.
pub const ENV_SERVER_HOST: &str = "SERVER_HOST";
/// Environment variable overriding the bind port.
pub const ENV_SERVER_PORT: &str = "SERVER_PORT";

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// SQLite database path.
    #[serde(default = "default_database")]
    database: String,

    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Id and secret lengths.
    #[serde(default)]
    tokens: TokenPolicy,
}

#[instrument]
fn default_database() -> String {
    "energy_war.db".to_string()
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            host: default_host(),
            port: default_port(),
            tokens: TokenPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or an invalid token policy.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.tokens.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(database = %config.database, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file at `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, or
    /// the defaults, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly named file is missing, any file
    /// fails to parse, or an override is malformed.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `DB_URI`, `SERVER_HOST` and `SERVER_PORT` as read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the port override is not a valid port number.
    #[instrument(skip(self, lookup))]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup(ENV_DB_URI).filter(|v| !v.is_empty()) {
            debug!(%database, "Database overridden from environment");
            self.database = database;
        }
        if let Some(host) = lookup(ENV_SERVER_HOST).filter(|v| !v.is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_SERVER_PORT).filter(|v| !v.is_empty()) {
            self.port = parse_port(&port)?;
        }
        Ok(self)
    }

    /// Replaces the database path.
    pub fn set_database(&mut self, database: String) {
        self.database = database;
    }

    /// Replaces the bind host.
    pub fn set_host(&mut self, host: String) {
        self.host = host;
    }

    /// Replaces the bind port.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// `host:port` for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses a port, tolerating the `:8080` form used by older deployments.
fn parse_port(text: &str) -> Result<u16, ConfigError> {
    let trimmed = text.trim_start_matches(':');
    trimmed.parse().map_err(|_| {
        warn!(value = %text, "Rejected port override");
        ConfigError::new(format!("Invalid port '{}'", text))
    })
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
