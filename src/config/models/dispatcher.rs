//! Dispatcher configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper bound for any per-action deadline
pub const MAX_TIMEOUT_MS: u64 = 60_000;

/// Tunables for validation defaults and batch execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Maximum simultaneously in-flight actions per batch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Deadline applied to actions without `timeoutMs`
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Success statuses applied to actions without `expectStatus`
    #[serde(default = "default_expect_status")]
    pub default_expect_status: Vec<u16>,
    /// User-Agent injected when an action sets none
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// TCP/TLS connect timeout for the shared client
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Reject action URLs that resolve to loopback/private/metadata hosts
    #[serde(default)]
    pub block_private_targets: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            default_timeout_ms: default_timeout_ms(),
            default_expect_status: default_expect_status(),
            user_agent: default_user_agent(),
            connect_timeout_ms: default_connect_timeout_ms(),
            block_private_targets: false,
        }
    }
}

impl DispatcherConfig {
    /// Set concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the default per-action timeout
    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Toggle private-target rejection
    pub fn with_block_private_targets(mut self, block: bool) -> Self {
        self.block_private_targets = block;
        self
    }

    /// Default success statuses as a set
    pub fn expect_status_set(&self) -> BTreeSet<u16> {
        self.default_expect_status.iter().copied().collect()
    }
}
