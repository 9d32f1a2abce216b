//! Outbound HTTP client construction
//!
//! One pooled client is built per dispatcher and shared by every action. It carries no
//! overall request timeout; each action arms its own deadline.

use crate::config::DispatcherConfig;
use crate::config::validation::check_public_target;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Redirect hops followed before a request fails
pub const MAX_REDIRECTS: usize = 10;

/// Configuration for the HTTP client pool
#[derive(Debug, Clone)]
pub struct HttpClientPoolConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// TCP keepalive interval
    pub tcp_keepalive: Duration,
    /// Refuse redirects to loopback, private or metadata hosts
    pub block_private_targets: bool,
}

impl Default for HttpClientPoolConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 16,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(5),
            tcp_keepalive: Duration::from_secs(60),
            block_private_targets: false,
        }
    }
}

impl From<&DispatcherConfig> for HttpClientPoolConfig {
    fn from(config: &DispatcherConfig) -> Self {
        Self {
            pool_max_idle_per_host: config.concurrency.max(1),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            block_private_targets: config.block_private_targets,
            ..Self::default()
        }
    }
}

/// Create the client used to execute actions
///
/// User-Agent is applied per request, not here.
pub fn create_dispatch_client(config: &HttpClientPoolConfig) -> Result<Client, reqwest::Error> {
    debug!(
        pool_max_idle_per_host = config.pool_max_idle_per_host,
        connect_timeout_ms = config.connect_timeout.as_millis() as u64,
        block_private_targets = config.block_private_targets,
        "Creating dispatch HTTP client"
    );

    ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout)
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(config.tcp_keepalive)
        .tcp_nodelay(true)
        .redirect(redirect_policy(config.block_private_targets))
        .build()
}

/// Redirect policy for dispatch clients
///
/// With `block_private` set, every hop's target goes through the same private-target check
/// as the action URL itself, and the request fails on the first hop that does not pass.
pub fn redirect_policy(block_private: bool) -> Policy {
    if !block_private {
        return Policy::limited(MAX_REDIRECTS);
    }

    Policy::custom(|attempt| {
        match check_redirect_hop(attempt.url(), attempt.previous().len()) {
            Ok(()) => attempt.follow(),
            Err(reason) => {
                warn!(target_url = %attempt.url(), reason = %reason, "Refusing redirect");
                attempt.error(reason)
            }
        }
    })
}

/// Decide whether a redirect to `url` may be followed after `hops` earlier requests
pub fn check_redirect_hop(url: &Url, hops: usize) -> Result<(), String> {
    if hops > MAX_REDIRECTS {
        return Err(format!("more than {} redirects", MAX_REDIRECTS));
    }
    check_public_target(url).map_err(|reason| format!("redirect to blocked target: {}", reason))
}
