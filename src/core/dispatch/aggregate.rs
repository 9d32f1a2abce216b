//! Result aggregation
//!
//! Reduces the completed result set of a batch into a verdict. The verdict never undoes
//! anything: actions that succeeded keep their side effects whatever their siblings did.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

use super::types::ExecutionResult;
use crate::utils::error::DisperserError;

/// Batch-level outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchVerdict {
    /// Every action returned an expected status
    Success,
    /// At least one action failed
    Failure,
}

/// Diagnostic entry for one failed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAction {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ExecutionResult> for FailedAction {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            id: result.id.clone(),
            status: result.status,
            error: result.error.clone(),
        }
    }
}

/// Aggregate failure raised once the whole batch has finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub correlation_id: String,
    /// Actions executed, including the failed ones
    pub total: usize,
    pub failed: Vec<FailedAction>,
}

impl BatchFailure {
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|failure| failure.id.as_str()).collect()
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} action(s) failed in batch {} [{}]",
            self.failed.len(),
            self.total,
            self.correlation_id,
            self.failed_ids().join(", ")
        )
    }
}

/// Successful batch summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub correlation_id: String,
    pub executed: usize,
}

/// Serializable view of a finished batch for callers and log sinks
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub correlation_id: String,
    pub verdict: BatchVerdict,
    pub executed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedAction>,
    pub results: Vec<ExecutionResult>,
    pub elapsed_ms: u64,
}

/// Complete result set of one executed batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    correlation_id: String,
    trace_id: Option<String>,
    results: Vec<ExecutionResult>,
    elapsed: Duration,
}

impl BatchReport {
    pub fn new(
        correlation_id: String,
        trace_id: Option<String>,
        results: Vec<ExecutionResult>,
        elapsed: Duration,
    ) -> Self {
        Self {
            correlation_id,
            trace_id,
            results,
            elapsed,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Results in completion order
    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    /// Result of the action with `id`
    pub fn result(&self, id: &str) -> Option<&ExecutionResult> {
        self.results.iter().find(|result| result.id == id)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn verdict(&self) -> BatchVerdict {
        if self.results.iter().all(|result| result.ok) {
            BatchVerdict::Success
        } else {
            BatchVerdict::Failure
        }
    }

    pub fn is_success(&self) -> bool {
        self.verdict() == BatchVerdict::Success
    }

    pub fn failures(&self) -> Vec<FailedAction> {
        self.results
            .iter()
            .filter(|result| !result.ok)
            .map(FailedAction::from)
            .collect()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            correlation_id: self.correlation_id.clone(),
            executed: self.results.len(),
        }
    }

    pub fn outcome(&self) -> BatchOutcome {
        BatchOutcome {
            correlation_id: self.correlation_id.clone(),
            verdict: self.verdict(),
            executed: self.results.len(),
            failed: self.failures(),
            results: self.results.clone(),
            elapsed_ms: self.elapsed.as_millis() as u64,
        }
    }

    /// Success summary, or the aggregate failure for the caller to act on
    pub fn into_result(self) -> Result<BatchSummary, DisperserError> {
        match self.verdict() {
            BatchVerdict::Success => Ok(self.summary()),
            BatchVerdict::Failure => Err(DisperserError::BatchExecutionFailure(BatchFailure {
                failed: self.failures(),
                total: self.results.len(),
                correlation_id: self.correlation_id,
            })),
        }
    }

    /// Emit the one structured log entry for this batch
    pub fn log_outcome(&self) {
        let elapsed_ms = self.elapsed.as_millis() as u64;
        let trace_id = self.trace_id.as_deref().unwrap_or("");

        match self.verdict() {
            BatchVerdict::Success => info!(
                correlation_id = %self.correlation_id,
                trace_id,
                executed = self.results.len(),
                elapsed_ms,
                "Batch dispatched successfully"
            ),
            BatchVerdict::Failure => {
                let failures = self.failures();
                let failed_ids: Vec<&str> = failures.iter().map(|f| f.id.as_str()).collect();
                let detail = serde_json::to_string(&failures).unwrap_or_default();
                error!(
                    correlation_id = %self.correlation_id,
                    trace_id,
                    executed = self.results.len(),
                    failed = failures.len(),
                    failed_ids = %failed_ids.join(","),
                    failures = %detail,
                    elapsed_ms,
                    "Batch dispatch failed"
                );
            }
        }
    }
}
