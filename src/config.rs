use serde::Deserialize;
use std::path::{Path, PathBuf};
use crate::error::{FleetError, Result};

/// Top-level configuration loaded from a TOML file.
///
/// Every section is optional; a missing file section falls back to defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Car store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), port: default_port() }
    }
}

/// SQLite store parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Database file, created on first start.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    /// At most [`MAX_BUSY_TIMEOUT_MS`].
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn check_busy_timeout(&self) -> Result<()> {
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(FleetError::Config(format!(
                "busy_timeout_ms must be <= {MAX_BUSY_TIMEOUT_MS}, got {}",
                self.busy_timeout_ms
            )));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path(), busy_timeout_ms: default_busy_timeout() }
    }
}

/// SQLite takes the busy timeout as an `i32` millisecond count.
pub const MAX_BUSY_TIMEOUT_MS: u64 = i32::MAX as u64;

fn default_bind() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8080 }
fn default_db_path() -> PathBuf { PathBuf::from("parkinglot.db") }
fn default_busy_timeout() -> u64 { 5000 }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FleetError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let config = Config::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| FleetError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(FleetError::Config("port must be > 0".into()));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(FleetError::Config("database path must not be empty".into()));
        }
        self.database.check_busy_timeout()?;
        Ok(())
    }
}
