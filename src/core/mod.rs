//! Core functionality for the disperser
//!
//! This module contains the batch model, the dispatch engine and message decoding.

pub mod dispatch;
pub mod disperser;
pub mod messaging;
