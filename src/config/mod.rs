//! Configuration management for the disperser
//!
//! Configuration is loaded once at startup (YAML file and/or environment) and passed down as
//! an explicit value; nothing reads it from process-wide state afterwards.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{DisperserError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Main configuration struct for the disperser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Validation defaults and execution tunables
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// HTTP ingress settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read_file(path.as_ref()).await?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse a YAML file without validating it
    async fn read_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DisperserError::Config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| DisperserError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self::default().with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// File (when given) or defaults, then environment overrides
    ///
    /// Only the merged result is validated, so an override may fix a bad file value.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok()).await
    }

    async fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match path {
            Some(path) => Self::read_file(path).await?,
            None => Self::default(),
        };

        let config = base.with_env_overrides(lookup)?;
        config.validate()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Apply environment-style overrides read through `lookup`
    ///
    /// Unset or empty variables leave the current value in place.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = parse_env::<usize>(&get, "DISPERSER_CONCURRENCY")? {
            self.dispatcher.concurrency = value;
        }
        if let Some(value) = parse_env::<u64>(&get, "DISPERSER_DEFAULT_TIMEOUT_MS")? {
            self.dispatcher.default_timeout_ms = value;
        }
        if let Some(value) = get("DISPERSER_DEFAULT_EXPECT_STATUS") {
            self.dispatcher.default_expect_status = value
                .split(',')
                .map(|status| {
                    status.trim().parse::<u16>().map_err(|e| {
                        DisperserError::Config(format!(
                            "DISPERSER_DEFAULT_EXPECT_STATUS has invalid status '{}': {}",
                            status, e
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(value) = get("DISPERSER_USER_AGENT") {
            self.dispatcher.user_agent = value;
        }
        if let Some(value) = parse_env::<bool>(&get, "DISPERSER_BLOCK_PRIVATE_TARGETS")? {
            self.dispatcher.block_private_targets = value;
        }
        if let Some(value) = get("HOST") {
            self.server.host = value;
        }
        if let Some(value) = parse_env::<u16>(&get, "PORT")? {
            self.server.port = value;
        }
        if let Some(value) = get("INGEST_API_KEY") {
            self.server.ingest_api_key = Some(value);
        }
        if let Some(value) = get("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = parse_env::<LogFormat>(&get, "LOG_FORMAT")? {
            self.logging.format = value;
        }

        Ok(self)
    }

    /// Get dispatcher configuration
    pub fn dispatcher(&self) -> &DispatcherConfig {
        &self.dispatcher
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.dispatcher
            .validate()
            .map_err(|e| DisperserError::Config(format!("Dispatcher config error: {}", e)))?;

        self.server
            .validate()
            .map_err(|e| DisperserError::Config(format!("Server config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| DisperserError::Config(format!("Logging config error: {}", e)))?;

        Ok(())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DisperserError::Config(format!("Failed to serialize config to JSON: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| DisperserError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_env<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    get(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| {
                DisperserError::Config(format!("{} has invalid value '{}': {}", key, value, e))
            })
        })
        .transpose()
}
