//! Networking utilities

pub mod http;
