//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::disperser::Disperser;
use crate::utils::error::Result;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Cloned into every worker; all fields are `Arc`s over immutable values.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration (shared read-only)
    pub config: Arc<Config>,
    /// Batch pipeline, including the pooled outbound client
    pub disperser: Arc<Disperser>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let disperser = Disperser::new(config.dispatcher())?;
        Ok(Self::with_disperser(config, disperser))
    }

    pub fn with_disperser(config: Config, disperser: Disperser) -> Self {
        Self {
            config: Arc::new(config),
            disperser: Arc::new(disperser),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
