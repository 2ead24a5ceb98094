//! Scripted in-memory transport.
//!
//! Answers each identifier with a preconfigured reply after a configurable
//! latency, and records how many requests were in flight at once. Used by the
//! test suites to exercise ordering, isolation and timing without a network.

use crate::batch::ResourceId;
use crate::error::FetchError;
use crate::io::{Transport, TransportResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockReply {
    Respond(TransportResponse),
    Fail(FetchError),
    /// Never completes; only a timeout ends the request.
    Hang,
}

#[derive(Debug, Clone)]
struct MockRoute {
    reply: MockReply,
    latency: Option<Duration>,
}

/// In-memory [`Transport`] with per-identifier scripted replies.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: HashMap<ResourceId, MockRoute>,
    default_latency: Duration,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latency applied to routes without their own.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.default_latency = latency;
        self
    }

    /// Answer `id` with a raw status and body.
    pub fn respond(self, id: impl Into<ResourceId>, status: u16, body: impl Into<bytes::Bytes>) -> Self {
        self.route(id, MockReply::Respond(TransportResponse::new(status, body)), None)
    }

    /// Answer `id` with status 200 and `value` serialized as JSON.
    pub fn respond_json(self, id: impl Into<ResourceId>, value: &serde_json::Value) -> Self {
        self.respond(id, 200, value.to_string())
    }

    /// Answer `id` with status 200 after a route-specific latency.
    pub fn respond_json_after(
        self,
        id: impl Into<ResourceId>,
        value: &serde_json::Value,
        latency: Duration,
    ) -> Self {
        let response = TransportResponse::new(200, value.to_string());
        self.route(id, MockReply::Respond(response), Some(latency))
    }

    /// Fail `id` with a transport-level error.
    pub fn fail(self, id: impl Into<ResourceId>, err: FetchError) -> Self {
        self.route(id, MockReply::Fail(err), None)
    }

    /// Never answer `id`.
    pub fn hang(self, id: impl Into<ResourceId>) -> Self {
        self.route(id, MockReply::Hang, None)
    }

    /// Total number of `get` calls received.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `get` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn route(mut self, id: impl Into<ResourceId>, reply: MockReply, latency: Option<Duration>) -> Self {
        self.routes.insert(id.into(), MockRoute { reply, latency });
        self
    }
}

/// Decrements the in-flight count even when the request future is dropped by a timeout.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, id: &ResourceId) -> Result<TransportResponse, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let Some(route) = self.routes.get(id) else {
            return Err(FetchError::Transport(format!("no route for {}", id)));
        };

        let latency = route.latency.unwrap_or(self.default_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match &route.reply {
            MockReply::Respond(response) => Ok(response.clone()),
            MockReply::Fail(err) => Err(err.clone()),
            MockReply::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_replies() {
        let transport = MockTransport::new()
            .respond_json("a", &json!([1, 2]))
            .respond("b", 500, "")
            .fail("c", FetchError::Transport("refused".into()));

        let a = transport.get(&"a".into()).await.unwrap();
        assert_eq!(a.status, 200);
        assert_eq!(&a.body[..], b"[1,2]");

        assert_eq!(transport.get(&"b".into()).await.unwrap().status, 500);
        assert!(transport.get(&"c".into()).await.is_err());
        assert!(transport.get(&"unknown".into()).await.is_err());
        assert_eq!(transport.requests(), 4);
        assert_eq!(transport.max_in_flight(), 1);
    }
}
