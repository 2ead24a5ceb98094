//! Process stage: reduce each fetch outcome to an integer.

use crate::config::{ExecutionMode, ProcessConfig};
use crate::pipeline::{payload_size, FetchOutcome, Metrics, ProcessedResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for the process stage.
#[derive(Debug, Clone)]
pub struct ProcessStageConfig {
    /// Simulated work applied to every non-empty payload
    pub work_delay: Duration,
    /// Maximum outcomes processed at once (None = all)
    pub concurrency: Option<usize>,
}

impl Default for ProcessStageConfig {
    fn default() -> Self {
        Self {
            work_delay: Duration::from_secs(1),
            concurrency: None,
        }
    }
}

impl From<&ProcessConfig> for ProcessStageConfig {
    fn from(config: &ProcessConfig) -> Self {
        Self {
            work_delay: config.work_delay(),
            concurrency: config.concurrency,
        }
    }
}

/// Maps fetch outcomes to processed results, preserving order.
pub struct ProcessStage {
    metrics: Arc<Metrics>,
    config: ProcessStageConfig,
}

impl ProcessStage {
    pub fn new(metrics: Arc<Metrics>, config: ProcessStageConfig) -> Self {
        Self { metrics, config }
    }

    /// Process every outcome, returning one result per outcome in the same order.
    pub async fn process_all(&self, outcomes: &[FetchOutcome], mode: ExecutionMode) -> Vec<ProcessedResult> {
        match mode {
            ExecutionMode::Concurrent => self.process_all_concurrent(outcomes).await,
            ExecutionMode::Sequential => self.process_all_sequential(outcomes).await,
        }
    }

    /// Baseline: one outcome fully processed, delay included, before the next.
    pub async fn process_all_sequential(&self, outcomes: &[FetchOutcome]) -> Vec<ProcessedResult> {
        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            results.push(self.process_one(outcome).await);
        }
        results
    }

    /// Process all outcomes concurrently, up to the configured bound.
    pub async fn process_all_concurrent(&self, outcomes: &[FetchOutcome]) -> Vec<ProcessedResult> {
        let total = outcomes.len();
        let limit = self.config.concurrency.unwrap_or(total).clamp(1, total.max(1));

        let mut results: Vec<ProcessedResult> = vec![0; total];
        let mut completed = stream::iter(outcomes.iter().enumerate())
            .map(|(index, outcome)| async move { (index, self.process_one(outcome).await) })
            .buffer_unordered(limit);

        while let Some((index, result)) = completed.next().await {
            results[index] = result;
        }

        results
    }

    async fn process_one(&self, outcome: &FetchOutcome) -> ProcessedResult {
        let size = outcome.payload().map_or(0, payload_size);

        // Failures and empty payloads have no work to simulate
        if size == 0 {
            self.metrics.add_item_skipped();
            return 0;
        }

        let start = Instant::now();
        tokio::time::sleep(self.config.work_delay).await;
        self.metrics.add_process_time(start.elapsed());
        self.metrics.add_item_processed();

        size
    }
}
