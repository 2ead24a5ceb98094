//! Sequences the two stages over one batch and times the whole run.

use crate::batch::Batch;
use crate::config::ExecutionMode;
use crate::pipeline::{BatchReport, FetchStage, Metrics, ProcessStage};
use std::sync::Arc;
use tokio::time::Instant;

/// Configuration for the driver.
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    /// How both stages dispatch their work
    pub mode: ExecutionMode,

    /// Log a metrics summary at the end of the run
    pub enable_metrics: bool,

    /// Optional path to save metrics JSON after the run completes
    pub metrics_output_path: Option<String>,
}

/// Runs fetch then process with a hard barrier in between.
pub struct Driver {
    fetch: FetchStage,
    process: ProcessStage,
    metrics: Arc<Metrics>,
    config: DriverConfig,
}

impl Driver {
    pub fn new(fetch: FetchStage, process: ProcessStage, metrics: Arc<Metrics>, config: DriverConfig) -> Self {
        Self {
            fetch,
            process,
            metrics,
            config,
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Run one batch to completion.
    ///
    /// Per-item failures end up in the report; there is no error path.
    pub async fn run(&self, batch: &Batch) -> BatchReport {
        let mode = self.config.mode;
        tracing::info!("Fetching {} resources ({})", batch.len(), mode);

        let start = Instant::now();

        let outcomes = self.fetch.fetch_all(batch, mode).await;
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        tracing::info!(
            "Fetch stage complete: {} succeeded, {} failed in {:.2}s",
            outcomes.len() - failed,
            failed,
            start.elapsed().as_secs_f64()
        );

        // Every outcome is in hand before the first item is processed
        let processed = self.process.process_all(&outcomes, mode).await;

        let elapsed = start.elapsed();
        tracing::info!("Process stage complete in {:.2}s total", elapsed.as_secs_f64());

        if self.config.enable_metrics {
            let snapshot = self.metrics.snapshot();
            tracing::info!("Run metrics: {}", snapshot);

            if let Some(ref path) = self.config.metrics_output_path {
                if let Err(e) = snapshot.save_to_file(path) {
                    tracing::warn!("Failed to save metrics to {}: {}", path, e);
                }
            }
        }

        BatchReport {
            mode,
            ids: batch.ids().to_vec(),
            outcomes,
            processed,
            elapsed,
        }
    }
}
