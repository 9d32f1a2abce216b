//! Helper functions for creating specific error types

use super::types::DisperserError;

/// Helper functions for creating specific errors
impl DisperserError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Server(message.into())
    }

    /// Whether redelivering the same payload could produce a different outcome
    pub fn is_redeliverable(&self) -> bool {
        matches!(self, Self::BatchExecutionFailure(_))
    }
}
