//! # oak-disperser
//!
//! Fans a batch of outbound HTTP actions out to their targets under a fixed concurrency
//! bound, with a per-action deadline and a per-action set of accepted statuses, then reduces
//! the results to a single verdict.
//!
//! ## Features
//!
//! - **All-or-nothing validation**: every offending field is reported before anything runs
//! - **Bounded concurrency**: at most `concurrency` actions in flight per batch
//! - **Isolated failures**: a timeout or bad status affects only its own action
//! - **Pub/Sub push ingress**: failed batches are redelivered, malformed ones are dropped
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oak_disperser::{Config, Disperser, PassthroughDecoder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None).await?;
//!     let disperser = Disperser::new(config.dispatcher())?;
//!
//!     let payload = br#"{"actions":[{"id":"ping","url":"https://example.com/hook"}]}"#;
//!     let summary = disperser.process(&PassthroughDecoder, payload).await?;
//!     println!("{} action(s) delivered", summary.executed);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::dispatch::{
    Action, ActionBody, ActionError, Batch, BatchFailure, BatchReport, BatchSummary,
    BatchValidator, BatchVerdict, DispatchExecutor, ExecutionResult, FieldError, HttpMethod,
    ValidationError,
};
pub use core::disperser::Disperser;
pub use core::messaging::{DecodeError, MessageDecoder, PassthroughDecoder, PubSubPushDecoder};
pub use utils::error::{DisperserError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information stamped by `build.rs`
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build time, seconds since the Unix epoch
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        }
    }
}

/// Build metadata of the running binary
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
