//! Configuration data models
//!
//! This module defines all configuration structures used by the disperser.

#![allow(missing_docs)]

pub mod dispatcher;
pub mod logging;
pub mod server;

// Re-export all configuration types
pub use dispatcher::*;
pub use logging::*;
pub use server::*;

/// Default number of simultaneously in-flight actions per batch
pub fn default_concurrency() -> usize {
    3
}

/// Default per-action deadline in milliseconds
pub fn default_timeout_ms() -> u64 {
    10_000
}

/// Statuses treated as success when an action declares none
pub fn default_expect_status() -> Vec<u16> {
    vec![200, 201, 202, 204]
}

pub fn default_user_agent() -> String {
    format!("oak-disperser/{}", env!("CARGO_PKG_VERSION"))
}

pub fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Default values for the HTTP service
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port (Cloud Run convention)
pub fn default_port() -> u16 {
    8080
}

/// Default maximum request body size in bytes
pub fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

pub fn default_log_level() -> String {
    "info".to_string()
}
