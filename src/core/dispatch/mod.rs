//! Batch dispatch engine
//!
//! Validation turns a raw payload into a [`Batch`]; the [`DispatchExecutor`] runs its actions
//! under a concurrency bound with per-action deadlines; the resulting [`BatchReport`] yields
//! the batch verdict.

mod aggregate;
mod errors;
mod executor;
mod transport;
mod types;
mod validation;


pub use aggregate::{
    BatchFailure, BatchOutcome, BatchReport, BatchSummary, BatchVerdict, FailedAction,
};
pub use errors::{ActionError, FieldError, ValidationError};
pub use executor::DispatchExecutor;
pub use transport::{ActionResponse, ActionTransport, DIAGNOSTIC_BODY_CHARS, HttpTransport};
pub use types::{Action, ActionBody, Batch, ExecutionResult, HttpMethod};
pub use validation::BatchValidator;
