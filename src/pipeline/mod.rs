//! Two-stage fan-out/fan-in pipeline.

mod driver;
mod fetch;
mod metrics;
mod outcome;
mod process;
mod report;

pub use driver::{Driver, DriverConfig};
pub use fetch::{FetchStage, FetchStageConfig};
pub use metrics::{Metrics, MetricsSnapshot};
pub use outcome::{payload_size, FetchOutcome, ProcessedResult};
pub use process::{ProcessStage, ProcessStageConfig};
pub use report::{BatchReport, Comparison};
