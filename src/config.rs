//! Configuration for the batch fetch pipeline.

use crate::batch::{Batch, REFERENCE_URLS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration for a batch run.
///
/// Every section is optional; an empty document yields the reference batch
/// fetched concurrently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identifiers to fetch
    #[serde(default)]
    pub batch: BatchConfig,

    /// Concurrent fan-out or one-at-a-time baseline
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Fetch stage configuration
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Process stage configuration
    #[serde(default)]
    pub process: ProcessConfig,

    /// Tokio runtime configuration
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// How the stages dispatch their per-item work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// All items in flight at once (up to the configured bound)
    #[default]
    Concurrent,
    /// Each item fully resolved before the next starts
    Sequential,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concurrent => f.write_str("concurrent"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown mode '{}', expected 'concurrent' or 'sequential'",
                other
            )),
        }
    }
}

/// The ordered identifiers for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
        }
    }
}

/// Fetch stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum fetches in flight (unset = one per item)
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Per-item timeout in seconds, covering connect, request and body
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Process stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Simulated work per non-empty payload, in milliseconds
    #[serde(default = "default_work_delay_ms")]
    pub work_delay_ms: u64,

    /// Maximum items processed at once (unset = all)
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl ProcessConfig {
    pub fn work_delay(&self) -> Duration {
        Duration::from_millis(self.work_delay_ms)
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            work_delay_ms: default_work_delay_ms(),
            concurrency: None,
        }
    }
}

/// Tokio runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Number of Tokio worker threads (unset = num CPUs)
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Log a metrics summary when the run completes
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Optional path to save metrics JSON after the run
    #[serde(default)]
    pub output_path: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file.
    /// Format is auto-detected from file extension (.yaml, .yml, or .json).
    pub fn from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Config = match ext {
            "json" => serde_json::from_str(&contents)?,
            _ => serde_yaml::from_str(&contents)?,
        };
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build the validated batch described by this configuration.
    pub fn batch(&self) -> anyhow::Result<Batch> {
        Batch::new(self.batch.urls.iter().cloned())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch.urls.is_empty() {
            anyhow::bail!("Batch must contain at least one URL");
        }
        self.batch()?;

        if self.fetch.concurrency == Some(0) {
            anyhow::bail!("Fetch concurrency must be > 0");
        }
        if self.process.concurrency == Some(0) {
            anyhow::bail!("Process concurrency must be > 0");
        }
        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("Fetch timeout must be > 0");
        }
        if self.fetch.connect_timeout_secs == 0 {
            anyhow::bail!("Connect timeout must be > 0");
        }
        if self.runtime.worker_threads == Some(0) {
            anyhow::bail!("Worker threads must be > 0");
        }
        Ok(())
    }
}

// Default value functions for serde
fn default_urls() -> Vec<String> {
    REFERENCE_URLS.iter().map(|url| url.to_string()).collect()
}
fn default_timeout_secs() -> u64 { 30 }
fn default_connect_timeout_secs() -> u64 { 5 }
fn default_user_agent() -> String { concat!("batch-fetch/", env!("CARGO_PKG_VERSION")).to_string() }
fn default_work_delay_ms() -> u64 { 1000 }
fn default_true() -> bool { true }
