//! Batch Fetch CLI
//!
//! Fetches a batch of JSON resources concurrently and reports timing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use batch_fetch::{build_runtime, compare, run_batch, Config, ExecutionMode};

#[derive(Parser)]
#[command(name = "batch-fetch")]
#[command(about = "Fetch and process a batch of JSON resources", long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to the built-in reference batch)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override execution mode (concurrent or sequential)
    #[arg(long, global = true)]
    mode: Option<ExecutionMode>,

    /// Override the maximum number of fetches in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and process the batch (default if no command specified)
    Run {
        /// URLs to fetch instead of the configured batch
        urls: Vec<String>,
    },

    /// Run the batch sequentially, then concurrently, and report the speedup
    Compare {
        /// URLs to fetch instead of the configured batch
        urls: Vec<String>,
    },

    /// Validate configuration
    Validate,

    /// Generate a sample configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "batch-fetch.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => run_command(load_config(&cli, Vec::new())?),

        Some(Commands::Run { ref urls }) => run_command(load_config(&cli, urls.clone())?),

        Some(Commands::Compare { ref urls }) => compare_command(load_config(&cli, urls.clone())?),

        Some(Commands::Validate) => {
            load_config(&cli, Vec::new())?;
            println!("Configuration is valid");
            Ok(())
        }

        Some(Commands::GenerateConfig { ref output }) => generate_config_command(output),
    }
}

/// Load the configuration file (if any) and apply command-line overrides.
fn load_config(cli: &Cli, urls: Vec<String>) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(c) = cli.concurrency {
        config.fetch.concurrency = Some(c);
    }
    if !urls.is_empty() {
        config.batch.urls = urls;
    }

    config.validate()?;
    Ok(config)
}

fn run_command(config: Config) -> Result<()> {
    let runtime = build_runtime(config.runtime.worker_threads)?;
    let report = runtime.block_on(run_batch(config))?;
    println!("{}", report);
    Ok(())
}

fn compare_command(config: Config) -> Result<()> {
    let runtime = build_runtime(config.runtime.worker_threads)?;
    let comparison = runtime.block_on(compare(config))?;
    println!("{}", comparison);
    Ok(())
}

fn generate_config_command(output: &Path) -> Result<()> {
    let yaml = r#"# Batch Fetch Configuration

# === BATCH: Resources to fetch, in report order ===
batch:
  urls:
    - "https://jsonplaceholder.typicode.com/todos/1"
    - "https://jsonplaceholder.typicode.com/todos/2"
    - "https://jsonplaceholder.typicode.com/todos/3"
    - "https://jsonplaceholder.typicode.com/todos/4"
    - "https://jsonplaceholder.typicode.com/todos/5"

# concurrent: every item in flight at once
# sequential: one item at a time (baseline, same results, slower)
mode: concurrent

# === FETCH: Network settings ===
fetch:
  # Maximum fetches in flight (omit for one per URL)
  # concurrency: 16

  # Per-URL deadline in seconds; a late fetch is reported as "timeout"
  timeout_secs: 30

  # TCP connect timeout in seconds
  connect_timeout_secs: 5

# === PROCESS: Post-processing of fetched payloads ===
process:
  # Simulated work per non-empty payload, in milliseconds
  work_delay_ms: 1000

  # Maximum payloads processed at once (omit for all)
  # concurrency: 16

# === RUNTIME ===
# runtime:
#   # Tokio async worker threads (omit for num CPUs)
#   worker_threads: 4

# === METRICS ===
metrics:
  # Log a metrics summary after the run
  enabled: true

  # Save metrics JSON after the run
  # output_path: "metrics.json"
"#;

    std::fs::write(output, yaml)?;
    println!("Generated sample configuration at: {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_default() {
        // No subcommand - should default to Run
        let cli = Cli::try_parse_from(["batch-fetch"]);
        assert!(cli.is_ok());
        assert!(cli.unwrap().command.is_none());
    }

    #[test]
    fn test_cli_parse_mode_override() {
        let cli = Cli::try_parse_from(["batch-fetch", "--mode", "sequential"]).unwrap();
        assert_eq!(cli.mode, Some(ExecutionMode::Sequential));

        assert!(Cli::try_parse_from(["batch-fetch", "--mode", "parallel"]).is_err());
    }

    #[test]
    fn test_cli_parse_run_with_urls() {
        let cli = Cli::try_parse_from(["batch-fetch", "run", "http://a.test/1", "http://a.test/2"]).unwrap();
        match cli.command {
            Some(Commands::Run { urls }) => assert_eq!(urls.len(), 2),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_load_config_overrides() {
        let cli = Cli::try_parse_from(["batch-fetch", "--concurrency", "2", "--mode", "sequential"]).unwrap();
        let config = load_config(&cli, vec!["http://a.test/1".to_string()]).unwrap();

        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert_eq!(config.fetch.concurrency, Some(2));
        assert_eq!(config.batch.urls, vec!["http://a.test/1".to_string()]);
    }

    #[test]
    fn test_generated_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch-fetch.yaml");

        generate_config_command(&path).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.urls.len(), 5);
    }
}
