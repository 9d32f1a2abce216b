//! Decode, validate, execute and log one batch
//!
//! Both ingress surfaces go through [`Disperser`], so every batch gets the same validation
//! defaults, the same concurrency bound and exactly one outcome log entry.

use tracing::{info, warn};

use super::dispatch::{Batch, BatchReport, BatchSummary, BatchValidator, DispatchExecutor};
use super::messaging::MessageDecoder;
use crate::config::DispatcherConfig;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct Disperser {
    validator: BatchValidator,
    executor: DispatchExecutor,
}

impl Disperser {
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        Ok(Self::with_executor(config, DispatchExecutor::new(config)?))
    }

    /// Use a caller-supplied executor, e.g. one over a test transport
    pub fn with_executor(config: &DispatcherConfig, executor: DispatchExecutor) -> Self {
        Self {
            validator: BatchValidator::new(config),
            executor,
        }
    }

    pub fn validator(&self) -> &BatchValidator {
        &self.validator
    }

    pub fn executor(&self) -> &DispatchExecutor {
        &self.executor
    }

    /// Validate a raw JSON payload
    pub fn prepare(&self, payload: &[u8]) -> Result<Batch> {
        self.validator.validate_slice(payload).map_err(|err| {
            warn!(error = %err, "Rejected batch");
            err.into()
        })
    }

    /// Execute a validated batch and log its outcome
    pub async fn dispatch(&self, batch: Batch) -> BatchReport {
        let report = self.executor.execute(batch).await;
        report.log_outcome();
        report
    }

    /// Decode, validate and execute one delivered message
    ///
    /// Errors only when nothing was executed; a failed batch still comes back as a report.
    pub async fn handle(&self, decoder: &dyn MessageDecoder, envelope: &[u8]) -> Result<BatchReport> {
        let message = decoder.decode(envelope).map_err(|err| {
            warn!(error = %err, "Rejected message");
            err
        })?;

        if let Some(message_id) = &message.message_id {
            info!(message_id = %message_id, "Received message");
        }

        let batch = self.prepare(&message.payload)?;
        Ok(self.dispatch(batch).await)
    }

    /// [`handle`](Self::handle) collapsed into the batch verdict
    pub async fn process(&self, decoder: &dyn MessageDecoder, envelope: &[u8]) -> Result<BatchSummary> {
        self.handle(decoder, envelope).await?.into_result()
    }
}
