//! The transport seam between the fetch stage and the network.

use crate::batch::ResourceId;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::io::client::create_client;
use async_trait::async_trait;
use bytes::Bytes;

/// Raw answer to a single GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body; empty when the status is not 200
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status counts as a successful fetch.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Capability to GET a resource by identifier.
///
/// Implementations report only transport-level problems as errors; any status
/// code the server sends back is a successful `get`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, id: &ResourceId) -> Result<TransportResponse, FetchError>;
}

/// reqwest-backed transport treating identifiers as URLs.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a client built from the fetch configuration.
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(create_client(config)?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, id: &ResourceId) -> Result<TransportResponse, FetchError> {
        let response = self.client.get(id.as_str()).send().await?;
        let status = response.status().as_u16();

        // Non-200 bodies are never decoded, skip reading them
        if status != 200 {
            return Ok(TransportResponse::new(status, Bytes::new()));
        }

        let body = response.bytes().await?;
        Ok(TransportResponse { status, body })
    }
}
