//! Durability tests for the ingestion path.
//!
//! The ack has two halves that must survive a process restart: the consumer
//! position is recorded in the store and restored at startup, and payloads
//! that cannot be decoded are quarantined instead of dropped.
//!
//! Requires Docker to be running for the ClickHouse testcontainer.

use std::sync::Arc;

use honey_store::offsets::{load_offset, save_offset};
use honey_store::{count_events, dead_letters};
use integration_tests::{fixtures, setup::TestContext};
use redpanda::{Consumer, RedpandaConfig};
use worker::IngestWorker;

fn worker_on(ctx: &TestContext) -> (Arc<Consumer>, IngestWorker) {
    let consumer = Arc::new(Consumer::new(RedpandaConfig::default()));
    let worker = IngestWorker::new(consumer.clone(), ctx.store.clone());
    (consumer, worker)
}

/// Committed positions are stored per topic and the highest one wins.
#[tokio::test]
async fn test_offset_survives_in_the_store() {
    let ctx = TestContext::new().await;

    assert!(load_offset(&ctx.store, "honey-events", 0)
        .await
        .unwrap()
        .is_none());

    save_offset(&ctx.store, "honey-events", 0, 42).await.unwrap();
    save_offset(&ctx.store, "honey-events", 0, 100).await.unwrap();

    assert_eq!(
        load_offset(&ctx.store, "honey-events", 0).await.unwrap(),
        Some(100)
    );

    // Positions are tracked per topic
    assert!(load_offset(&ctx.store, "other-topic", 0)
        .await
        .unwrap()
        .is_none());
}

/// A restarted worker seeks the consumer back to the stored position
/// instead of jumping to the latest broker offset.
#[tokio::test]
async fn test_worker_resumes_from_stored_offset() {
    let ctx = TestContext::new().await;
    save_offset(&ctx.store, "honey-events", 0, 7).await.unwrap();

    let (consumer, worker) = worker_on(&ctx);
    worker.restore_position().await.unwrap();

    assert_eq!(consumer.current_offset(), 7);
}

/// With no stored position the consumer keeps its unset start offset, so
/// the first connect falls back to the latest broker offset.
#[tokio::test]
async fn test_fresh_start_leaves_position_unset() {
    let ctx = TestContext::new().await;

    let (consumer, worker) = worker_on(&ctx);
    worker.restore_position().await.unwrap();

    assert_eq!(consumer.current_offset(), -1);
}

/// A malformed payload in a batch is quarantined with its decode error;
/// the well-formed payloads in the same batch are still persisted.
#[tokio::test]
async fn test_malformed_payload_is_quarantined() {
    let ctx = TestContext::new().await;
    let (_consumer, worker) = worker_on(&ctx);

    let deliveries = vec![
        fixtures::delivery(
            &fixtures::sensor_payload("GET", "/admin", "203.0.113.30"),
            Some("sensor-1"),
        ),
        fixtures::delivery("not json at all", None),
    ];

    let count = worker.process_deliveries(&deliveries).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(count_events(&ctx.store).await.unwrap(), 1);

    let letters = dead_letters(&ctx.store, 10).await.unwrap();
    assert_eq!(letters.len(), 1);
    assert_eq!(letters[0].payload, "not json at all");
    assert!(letters[0].error.contains("decode"));
}

/// Quarantined payloads keep their message attributes for later replay.
#[tokio::test]
async fn test_dead_letter_preserves_attributes() {
    let ctx = TestContext::new().await;
    let (_consumer, worker) = worker_on(&ctx);

    let deliveries = vec![fixtures::delivery("{broken", Some("sensor-9"))];
    worker.process_deliveries(&deliveries).await.unwrap();

    let letters = dead_letters(&ctx.store, 10).await.unwrap();
    assert_eq!(letters.len(), 1);

    let attributes: serde_json::Value =
        serde_json::from_str(&letters[0].attributes).unwrap();
    assert_eq!(attributes["hostname"], "sensor-9");
}
