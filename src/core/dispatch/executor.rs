//! Bounded-concurrency batch execution
//!
//! All actions of a batch are driven from the calling task through `buffer_unordered`. Up to
//! `concurrency` action futures are polled at once; when one resolves, the next pending action
//! (in submission order) is admitted. Futures interleave only at their await points (request
//! send, response read, timer), so the admission count is the only shared state and needs
//! no lock.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

use super::aggregate::BatchReport;
use super::errors::ActionError;
use super::transport::{ActionTransport, HttpTransport};
use super::types::{Action, Batch, ExecutionResult};
use crate::config::DispatcherConfig;
use crate::utils::error::Result;

/// Executes batches against an [`ActionTransport`]
#[derive(Clone)]
pub struct DispatchExecutor {
    transport: Arc<dyn ActionTransport>,
    concurrency: usize,
}

impl std::fmt::Debug for DispatchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchExecutor")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl DispatchExecutor {
    /// Create an executor sending over HTTP
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config.concurrency))
    }

    /// Create an executor over any transport
    pub fn with_transport(transport: Arc<dyn ActionTransport>, concurrency: usize) -> Self {
        Self {
            transport,
            concurrency: concurrency.max(1),
        }
    }

    /// Maximum simultaneously in-flight actions
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Execute every action of `batch` and collect one result per action
    ///
    /// Never fails: per-action errors are folded into their results. Results come back in
    /// completion order.
    pub async fn execute(&self, batch: Batch) -> BatchReport {
        let (correlation_id, trace_id, actions) = batch.into_parts();
        let span = info_span!(
            "dispatch",
            correlation_id = %correlation_id,
            trace_id = trace_id.as_deref().unwrap_or(""),
        );

        async move {
            let total = actions.len();
            info!(
                actions = total,
                concurrency = self.concurrency,
                "Dispatching batch"
            );

            let start = Instant::now();
            let results: Vec<ExecutionResult> = stream::iter(actions)
                .map(|action| self.run_action(action))
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            debug_assert_eq!(results.len(), total);
            BatchReport::new(correlation_id, trace_id, results, start.elapsed())
        }
        .instrument(span)
        .await
    }

    /// Run one action to exactly one result
    async fn run_action(&self, action: Action) -> ExecutionResult {
        let start = Instant::now();
        let timeout_ms = action.timeout_ms();

        // Dropping the send future on expiry cancels only this action's request
        let outcome = match tokio::time::timeout(action.timeout(), self.transport.send(&action))
            .await
        {
            Ok(Ok(response)) if action.expects(response.status) => Ok(response.status),
            Ok(Ok(response)) => Err(ActionError::StatusMismatch {
                status: response.status,
                snippet: response.body_snippet.unwrap_or_default(),
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ActionError::Timeout { timeout_ms }),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(status) => {
                debug!(
                    action_id = action.id(),
                    method = %action.method(),
                    status,
                    elapsed_ms,
                    "Action succeeded"
                );
                ExecutionResult::success(action.id(), status)
            }
            Err(err) => {
                warn!(
                    action_id = action.id(),
                    method = %action.method(),
                    url = %action.url(),
                    status = err.status(),
                    elapsed_ms,
                    error = %err,
                    "Action failed"
                );
                ExecutionResult::failure(action.id(), &err)
            }
        }
    }
}
