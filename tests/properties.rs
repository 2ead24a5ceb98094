//! Ordering and isolation properties over scripted transports.

use batch_fetch::{
    compare_with_transport, run_with_transport, Config, ExecutionMode, FetchError, FetchOutcome,
    MockTransport, Transport,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Ten items whose latency decreases with position, so completion order is reversed.
fn reversed_latency_transport(ids: &[String]) -> MockTransport {
    ids.iter().enumerate().fold(MockTransport::new(), |transport, (i, id)| {
        let latency = Duration::from_millis(10 * (ids.len() - i) as u64);
        if i % 4 == 3 {
            transport.fail(id.as_str(), FetchError::Transport(format!("reset {}", i)))
        } else {
            transport.respond_json_after(id.as_str(), &json!(vec![i; i]), latency)
        }
    })
}

fn config_with(ids: &[String]) -> Config {
    let mut config = Config::default();
    config.batch.urls = ids.to_vec();
    config.process.work_delay_ms = 50;
    config.metrics.enabled = false;
    config
}

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("resource-{}", i)).collect()
}

#[tokio::test(start_paused = true)]
async fn test_outcome_i_belongs_to_identifier_i() {
    let ids = ids(10);
    let transport: Arc<dyn Transport> = Arc::new(reversed_latency_transport(&ids));

    let report = run_with_transport(&config_with(&ids), transport).await.unwrap();

    assert_eq!(report.ids.len(), ids.len());
    assert_eq!(report.outcomes.len(), ids.len());
    assert_eq!(report.processed.len(), ids.len());
    for (i, outcome) in report.outcomes.iter().enumerate() {
        if i % 4 == 3 {
            assert_eq!(outcome.reason(), Some(format!("reset {}", i)));
            assert_eq!(report.processed[i], 0);
        } else {
            assert_eq!(outcome, &FetchOutcome::Success(json!(vec![i; i])));
            assert_eq!(report.processed[i], i);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_repeated_runs_are_identical() {
    let ids = ids(10);
    let transport: Arc<dyn Transport> = Arc::new(reversed_latency_transport(&ids));
    let config = config_with(&ids);

    let first = run_with_transport(&config, transport.clone()).await.unwrap();
    let second = run_with_transport(&config, transport).await.unwrap();

    assert!(first.agrees_with(&second));
}

#[tokio::test(start_paused = true)]
async fn test_compare_runs_agree() {
    let ids = ids(6);
    let transport: Arc<dyn Transport> = Arc::new(reversed_latency_transport(&ids));

    let comparison = compare_with_transport(&config_with(&ids), transport).await.unwrap();

    assert!(comparison.consistent());
    assert_eq!(comparison.sequential.mode, ExecutionMode::Sequential);
    assert_eq!(comparison.concurrent.mode, ExecutionMode::Concurrent);
    assert!(comparison.speedup() > 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_fetch_concurrency_keeps_order() {
    let ids = ids(12);
    let mock = Arc::new(reversed_latency_transport(&ids));
    let mut config = config_with(&ids);
    config.fetch.concurrency = Some(4);
    config.process.concurrency = Some(2);

    let bounded = run_with_transport(&config, mock.clone()).await.unwrap();
    assert!(mock.max_in_flight() <= 4);

    config.fetch.concurrency = None;
    config.process.concurrency = None;
    let unbounded = run_with_transport(&config, mock.clone()).await.unwrap();

    assert!(bounded.agrees_with(&unbounded));
    assert!(bounded.elapsed > unbounded.elapsed);
}

#[tokio::test]
async fn test_blank_identifier_is_rejected_before_fetching() {
    let mock = Arc::new(MockTransport::new());
    let mut config = Config::default();
    config.batch.urls = vec!["a".to_string(), " ".to_string()];

    let result = run_with_transport(&config, mock.clone()).await;

    assert!(result.is_err());
    assert_eq!(mock.requests(), 0);
}
