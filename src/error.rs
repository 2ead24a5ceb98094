//! Per-item fetch failures.
//!
//! Every variant is absorbed by the fetch stage into a [`FetchOutcome::Failure`]
//! and never propagated as a run-level error.
//!
//! [`FetchOutcome::Failure`]: crate::pipeline::FetchOutcome::Failure

use thiserror::Error;

/// Why a single resource could not be turned into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a status other than 200.
    #[error("{0}")]
    HttpStatus(u16),

    /// Connection, protocol or client-side failure.
    #[error("{0}")]
    Transport(String),

    /// The body could not be decoded as JSON.
    #[error("{0}")]
    Decode(String),

    /// The fetch did not finish within the per-item timeout.
    #[error("timeout")]
    Timeout,
}

impl FetchError {
    /// Short label for the failure category, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HttpStatus(_) => "http_status",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Timeout => "timeout",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
