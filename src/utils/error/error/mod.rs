//! Error handling for the disperser
//!
//! This module defines the top-level error type used throughout the crate.

#![allow(missing_docs)]

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{DisperserError, Result};
