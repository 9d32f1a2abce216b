//! Integration tests for oak-disperser
//!
//! These tests run the real HTTP transport against local mock targets.

pub mod config_tests;
pub mod dispatch_tests;
pub mod server_tests;
