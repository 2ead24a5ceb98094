//! Batch Fetch
//!
//! Fetches a fixed batch of JSON resources, reduces each fetched payload to an
//! integer, and reports the outcome of every item along with total wall time.
//!
//! # Architecture
//!
//! - **Batch**: ordered, validated resource identifiers
//! - **I/O**: the [`Transport`] seam and its reqwest implementation
//! - **Pipeline**: fetch stage, process stage and the driver joining them
//!
//! Both stages run either concurrently or one item at a time; the two modes
//! produce identical results and differ only in latency. Individual failures
//! never abort a run.
//!
//! # Usage
//!
//! ```no_run
//! use batch_fetch::{run_batch, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let report = run_batch(Config::default()).await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;

pub use batch::{Batch, ResourceId};
pub use config::{Config, ExecutionMode};
pub use error::FetchError;
pub use io::{HttpTransport, MockTransport, Transport, TransportResponse};
pub use pipeline::{BatchReport, Comparison, Driver, FetchOutcome, Metrics, ProcessedResult};

use anyhow::Result;
use pipeline::{DriverConfig, FetchStage, ProcessStage};
use std::sync::Arc;

/// Run the configured batch over HTTP.
pub async fn run_batch(config: Config) -> Result<BatchReport> {
    config.validate()?;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.fetch)?);
    run_with_transport(&config, transport).await
}

/// Run the configured batch through an arbitrary transport.
pub async fn run_with_transport(config: &Config, transport: Arc<dyn Transport>) -> Result<BatchReport> {
    let batch = config.batch()?;
    let driver = build_driver(config, transport, config.mode);
    Ok(driver.run(&batch).await)
}

/// Run the batch sequentially, then concurrently, over HTTP.
pub async fn compare(config: Config) -> Result<Comparison> {
    config.validate()?;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.fetch)?);
    compare_with_transport(&config, transport).await
}

/// Run the batch in both modes through the same transport.
pub async fn compare_with_transport(config: &Config, transport: Arc<dyn Transport>) -> Result<Comparison> {
    let batch = config.batch()?;

    tracing::info!("Running sequential baseline");
    let sequential = build_driver(config, transport.clone(), ExecutionMode::Sequential)
        .run(&batch)
        .await;

    tracing::info!("Running concurrent pipeline");
    let concurrent = build_driver(config, transport, ExecutionMode::Concurrent)
        .run(&batch)
        .await;

    let comparison = Comparison {
        sequential,
        concurrent,
    };

    if !comparison.consistent() {
        tracing::warn!("Sequential and concurrent runs disagree; responses changed between runs");
    }

    Ok(comparison)
}

/// Wire up both stages and a driver with fresh metrics.
pub fn build_driver(config: &Config, transport: Arc<dyn Transport>, mode: ExecutionMode) -> Driver {
    let metrics = Metrics::new();
    let fetch = FetchStage::new(transport, metrics.clone(), (&config.fetch).into());
    let process = ProcessStage::new(metrics.clone(), (&config.process).into());

    let driver_config = DriverConfig {
        mode,
        enable_metrics: config.metrics.enabled,
        metrics_output_path: config.metrics.output_path.clone(),
    };

    Driver::new(fetch, process, metrics, driver_config)
}

/// Build a Tokio runtime with the specified configuration.
pub fn build_runtime(worker_threads: Option<usize>) -> Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();

    if let Some(threads) = worker_threads {
        builder.worker_threads(threads);
    }

    builder.enable_all();

    Ok(builder.build()?)
}
