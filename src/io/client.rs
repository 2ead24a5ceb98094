//! HTTP client configuration.
//!
//! Connection pool and timeout settings for the reqwest client behind
//! [`HttpTransport`](super::HttpTransport).

use crate::config::FetchConfig;
use anyhow::{Context, Result};
use std::time::Duration;

/// Create a reqwest client tuned for a burst of small JSON requests.
///
/// The overall per-item deadline is enforced by the fetch stage, so only the
/// connect phase is bounded here.
pub fn create_client(config: &FetchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        // How long to wait for a TCP/TLS connection to be established
        .connect_timeout(config.connect_timeout())
        // How long to keep idle connections in the pool
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(config.concurrency.unwrap_or(32))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent(config.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")
}
