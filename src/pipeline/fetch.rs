//! Fetch stage: one GET per identifier, outcomes in batch order.
//!
//! The concurrent variant runs a small worker pool over a shared work queue:
//!
//! ```text
//!                 ┌──────────┐
//!            ┌───▶│ worker 1 │───┐
//! ┌───────┐  │    └──────────┘   │   ┌──────────────┐
//! │ queue │──┤        ...        ├──▶│ result slots │
//! └───────┘  │    ┌──────────┐   │   └──────────────┘
//!            └───▶│ worker N │───┘
//!                 └──────────┘
//! ```
//!
//! Each queue item carries its batch index and each result is written back
//! into that index only, so completion order never affects the output.
//! With no configured bound there is one worker per item.

use crate::batch::{Batch, ResourceId};
use crate::config::{ExecutionMode, FetchConfig};
use crate::error::FetchError;
use crate::io::{Transport, TransportResponse};
use crate::pipeline::{FetchOutcome, Metrics};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Configuration for the fetch stage.
#[derive(Debug, Clone)]
pub struct FetchStageConfig {
    /// Maximum fetches in flight (None = one per item)
    pub concurrency: Option<usize>,
    /// Deadline for a single fetch, including reading the body
    pub timeout: Duration,
}

impl Default for FetchStageConfig {
    fn default() -> Self {
        Self {
            concurrency: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&FetchConfig> for FetchStageConfig {
    fn from(config: &FetchConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            timeout: config.timeout(),
        }
    }
}

/// Fetches a batch through a [`Transport`].
pub struct FetchStage {
    transport: Arc<dyn Transport>,
    metrics: Arc<Metrics>,
    config: FetchStageConfig,
}

impl FetchStage {
    pub fn new(transport: Arc<dyn Transport>, metrics: Arc<Metrics>, config: FetchStageConfig) -> Self {
        Self {
            transport,
            metrics,
            config,
        }
    }

    /// Fetch every identifier, returning one outcome per item in batch order.
    pub async fn fetch_all(&self, batch: &Batch, mode: ExecutionMode) -> Vec<FetchOutcome> {
        match mode {
            ExecutionMode::Concurrent => self.fetch_all_concurrent(batch).await,
            ExecutionMode::Sequential => self.fetch_all_sequential(batch).await,
        }
    }

    /// Baseline: each fetch completes before the next one starts.
    pub async fn fetch_all_sequential(&self, batch: &Batch) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::with_capacity(batch.len());
        for id in batch {
            outcomes.push(fetch_one(self.transport.as_ref(), id, self.config.timeout, &self.metrics).await);
        }
        outcomes
    }

    /// Dispatch all fetches without waiting on each other and join on all of them.
    pub async fn fetch_all_concurrent(&self, batch: &Batch) -> Vec<FetchOutcome> {
        let total = batch.len();
        if total == 0 {
            return Vec::new();
        }

        let workers = self.config.concurrency.unwrap_or(total).clamp(1, total);
        tracing::debug!("Fetching {} resources with {} workers", total, workers);

        // Fill the work queue up front, in batch order
        let (work_tx, work_rx) = async_channel::bounded::<(usize, ResourceId)>(total);
        for (index, id) in batch.iter().cloned().enumerate() {
            let _ = work_tx.send((index, id)).await;
        }
        work_tx.close();

        let (result_tx, mut result_rx) = mpsc::channel::<(usize, FetchOutcome)>(total);

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let transport = self.transport.clone();
            let metrics = self.metrics.clone();
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let timeout = self.config.timeout;

            let handle = tokio::spawn(async move {
                while let Ok((index, id)) = work_rx.recv().await {
                    let outcome = fetch_one(transport.as_ref(), &id, timeout, &metrics).await;
                    if result_tx.send((index, outcome)).await.is_err() {
                        tracing::debug!("Result receiver dropped, stopping fetch worker");
                        break;
                    }
                }
            });

            handles.push(handle);
        }
        drop(result_tx);

        let mut slots: Vec<Option<FetchOutcome>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = result_rx.recv().await {
            slots[index] = Some(outcome);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Fetch worker panicked: {}", e);
            }
        }

        // A slot is only empty if its worker died mid-fetch
        slots
            .into_iter()
            .zip(batch.iter())
            .map(|(slot, id)| {
                slot.unwrap_or_else(|| {
                    tracing::warn!("Fetch task aborted for {}", id);
                    self.metrics.add_fetch_failure();
                    FetchOutcome::Failure(FetchError::Transport("fetch task aborted".to_string()))
                })
            })
            .collect()
    }
}

/// Fetch and decode a single resource, absorbing every failure into the outcome.
async fn fetch_one(
    transport: &dyn Transport,
    id: &ResourceId,
    timeout: Duration,
    metrics: &Metrics,
) -> FetchOutcome {
    let start = Instant::now();
    let result = match tokio::time::timeout(timeout, transport.get(id)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout),
    };
    metrics.add_fetch_time(start.elapsed());

    match result.and_then(|response| decode_response(response, metrics)) {
        Ok(payload) => {
            tracing::debug!("Fetched {} in {:?}", id, start.elapsed());
            metrics.add_item_fetched();
            FetchOutcome::Success(payload)
        }
        Err(err) => {
            log_failure(id, &err, timeout);
            metrics.add_fetch_failure();
            if err == FetchError::Timeout {
                metrics.add_fetch_timeout();
            }
            FetchOutcome::Failure(err)
        }
    }
}

/// Turn a raw response into a payload; anything but 200 is a failure.
fn decode_response(response: TransportResponse, metrics: &Metrics) -> Result<Value, FetchError> {
    if !response.is_success() {
        return Err(FetchError::HttpStatus(response.status));
    }
    metrics.add_bytes_read(response.body.len() as u64);
    Ok(serde_json::from_slice(&response.body)?)
}

fn log_failure(id: &ResourceId, err: &FetchError, timeout: Duration) {
    match err {
        FetchError::HttpStatus(status) => tracing::warn!("Error: {} for {}", status, id),
        FetchError::Transport(msg) => tracing::warn!("Client error: {} for {}", msg, id),
        FetchError::Decode(msg) => tracing::warn!("Invalid JSON body: {} for {}", msg, id),
        FetchError::Timeout => tracing::warn!("Timed out after {:?} for {}", timeout, id),
    }
}
