//! Server configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional TOML file
//! (`bloodbank.toml`, or the path in `BLOODBANK_CONFIG`), then
//! `BLOODBANK_*` environment variables such as `BLOODBANK_PORT`.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "BLOODBANK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "bloodbank.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// How long a writer waits for the store lock
    pub busy_timeout_ms: u64,
    /// JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl ServerConfig {
    /// Load from the default file location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::load_from(&file, Environment::with_prefix("BLOODBANK"))
    }

    /// Load from an explicit file and environment source.
    pub fn load_from(file: &str, env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("database_path", "bloodbank.db")?
            .set_default("busy_timeout_ms", 5000)?
            .set_default("log_json", false)?
            .add_source(File::with_name(file).required(false))
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
