//! Dispatch error types

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One offending field in a rejected batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Path of the field, e.g. `actions[2].timeoutMs`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Batch rejected before any action ran
///
/// Lists every offending field, not only the first one found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Paths of all offending fields
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|error| error.field.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().any(|candidate| candidate == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s): ", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Why a single action did not succeed
///
/// Always recorded into that action's result, never propagated to siblings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Deadline elapsed; the in-flight call was cancelled
    #[error("aborted: no response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// DNS, connect, TLS or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response received with a status outside `expectStatus`
    #[error("unexpected status {}{}", .status, snippet_suffix(.snippet))]
    StatusMismatch { status: u16, snippet: String },
}

fn snippet_suffix(snippet: &str) -> String {
    if snippet.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", snippet)
    }
}

impl ActionError {
    /// Status observed on the wire, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ActionError::StatusMismatch { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ActionError::Timeout { .. })
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_connect() {
            "connection failed"
        } else if err.is_timeout() {
            "timed out"
        } else if err.is_builder() {
            "invalid request"
        } else if err.is_redirect() {
            "redirect failed"
        } else if err.is_body() || err.is_decode() {
            "body error"
        } else {
            "request failed"
        };

        // reqwest's Display omits the underlying io/hyper cause
        let mut message = format!("{}: {}", kind, err);
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        ActionError::Transport(message)
    }
}
