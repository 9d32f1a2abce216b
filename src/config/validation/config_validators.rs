//! Validators for configuration sections

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::warn;

impl Validate for DispatcherConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }

        if self.default_timeout_ms == 0 || self.default_timeout_ms > MAX_TIMEOUT_MS {
            return Err(format!(
                "default_timeout_ms must be between 1 and {}, got {}",
                MAX_TIMEOUT_MS, self.default_timeout_ms
            ));
        }

        if self.default_expect_status.is_empty() {
            return Err("default_expect_status cannot be empty".to_string());
        }

        if let Some(status) = self
            .default_expect_status
            .iter()
            .find(|status| !(100..=599).contains(*status))
        {
            return Err(format!(
                "default_expect_status contains invalid HTTP status {}",
                status
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }

        if reqwest::header::HeaderValue::from_str(&self.user_agent).is_err() {
            return Err("user_agent is not a valid header value".to_string());
        }

        if self.connect_timeout_ms == 0 {
            return Err("connect_timeout_ms must be greater than 0".to_string());
        }

        if self.concurrency > 256 {
            warn!(
                concurrency = self.concurrency,
                "Very high dispatch concurrency configured"
            );
        }

        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            return Err("max_body_size must be greater than 0".to_string());
        }

        if let Some(key) = &self.ingest_api_key {
            if key.trim().is_empty() {
                return Err("ingest_api_key cannot be blank when set".to_string());
            }
            if key.len() < 16 {
                warn!("ingest_api_key is shorter than 16 characters");
            }
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("logging level cannot be empty".to_string());
        }

        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map_err(|e| format!("invalid logging level '{}': {}", self.level, e))?;

        Ok(())
    }
}
