//! Configuration validation
//!
//! - `trait_def`: the `Validate` trait implemented by every config section
//! - `config_validators`: rules for dispatcher, server and logging sections
//! - `ssrf`: private/internal target detection shared with batch validation

mod config_validators;
mod ssrf;
mod trait_def;

pub use trait_def::Validate;

pub use ssrf::check_public_target;
