//! Utility modules for the disperser
//!
//! - **error**: crate error type and its HTTP mapping
//! - **logging**: tracing subscriber setup
//! - **net**: shared outbound HTTP client

pub mod error;
pub mod logging;
pub mod net;
