//! Validation trait definition

/// Validation trait for configuration sections
///
/// Errors are human-readable and name the offending key.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
