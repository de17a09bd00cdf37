//! End-to-end tests for the honeypot pipeline.
//!
//! These tests drive the full data flow:
//! sensor payload → decode → ClickHouse → geo sweep → classify sweep
//!
//! The enrichment services are in-process stubs; ClickHouse is real.
//! Requires Docker to be running for the ClickHouse testcontainer.

use honey_store::{count_events, ip_info_for, pending_addresses, pending_events, verdict_for};
use integration_tests::{fixtures, setup::TestContext, stubs};
use worker::ingest::decode_delivery;

/// Full pipeline: ingest → geo sweep → classify sweep, then verify both
/// annotation tables and that nothing is left pending.
#[tokio::test]
async fn test_full_pipeline_e2e() {
    let ctx = TestContext::new().await;

    // Ingest four events: two origin addresses, one shared, one addressless
    let events = vec![
        fixtures::captured_event("GET", "/admin", "203.0.113.7"),
        fixtures::captured_event("POST", "/wp-login.php", "203.0.113.7"),
        fixtures::captured_event("GET", "/setup.php", "198.51.100.4"),
        fixtures::addressless_event(),
    ];
    let event_ids: Vec<String> = events.iter().map(|e| e.event_id.clone()).collect();

    let inserted = ctx.ingest(events).await.expect("Failed to ingest events");
    assert_eq!(inserted, 4);
    assert_eq!(count_events(&ctx.store).await.unwrap(), 4);

    // Geo sweep: two distinct addresses, addressless event excluded
    let ipinfo = stubs::IpInfoStub::start().await;
    let summary = ctx.geo_sweep(&ipinfo).run().await.expect("Geo sweep failed");

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.enriched, 2);
    assert_eq!(summary.failed(), 0);

    let annotation = ip_info_for(&ctx.store, "203.0.113.7")
        .await
        .unwrap()
        .expect("Address should be annotated");
    assert_eq!(annotation.country.as_deref(), Some("United States"));
    assert_eq!(annotation.asn.as_deref(), Some("AS13335"));

    assert!(ip_info_for(&ctx.store, "198.51.100.4")
        .await
        .unwrap()
        .is_some());

    // Classify sweep: all four events, including the addressless one
    let llm = stubs::LlmStub::start(&fixtures::verdict_reply("high")).await;
    let summary = ctx
        .classify_sweep(&llm)
        .run()
        .await
        .expect("Classify sweep failed");

    assert_eq!(summary.discovered, 4);
    assert_eq!(summary.enriched, 4);
    assert_eq!(llm.request_count(), 4);

    for event_id in &event_ids {
        let verdict = verdict_for(&ctx.store, event_id)
            .await
            .unwrap()
            .expect("Event should be classified");
        assert_eq!(verdict.malicious, "high");
        assert_eq!(verdict.type_of_exploit.as_deref(), Some("SQL Injection"));
    }

    // Nothing pending after both sweeps
    assert!(pending_addresses(&ctx.store).await.unwrap().is_empty());
    assert!(pending_events(&ctx.store).await.unwrap().is_empty());
}

/// A second sweep run over an already-enriched store discovers no work.
#[tokio::test]
async fn test_sweeps_are_idempotent() {
    let ctx = TestContext::new().await;

    ctx.ingest(vec![fixtures::captured_event("GET", "/", "192.0.2.1")])
        .await
        .expect("Failed to ingest");

    let ipinfo = stubs::IpInfoStub::start().await;
    let llm = stubs::LlmStub::start(&fixtures::verdict_reply("low")).await;

    let first = ctx.geo_sweep(&ipinfo).run().await.unwrap();
    assert_eq!(first.enriched, 1);
    let first = ctx.classify_sweep(&llm).run().await.unwrap();
    assert_eq!(first.enriched, 1);

    // Second pass: the anti-joins come back empty, no service calls made
    let second = ctx.geo_sweep(&ipinfo).run().await.unwrap();
    assert_eq!(second.discovered, 0);
    assert_eq!(ipinfo.request_count(), 1);

    let second = ctx.classify_sweep(&llm).run().await.unwrap();
    assert_eq!(second.discovered, 0);
    assert_eq!(llm.request_count(), 1);
}

/// Events sharing an origin address produce exactly one lookup and one
/// annotation row.
#[tokio::test]
async fn test_shared_address_is_looked_up_once() {
    let ctx = TestContext::new().await;

    ctx.ingest(vec![
        fixtures::captured_event("GET", "/a", "203.0.113.9"),
        fixtures::captured_event("GET", "/b", "203.0.113.9"),
        fixtures::captured_event("GET", "/c", "203.0.113.9"),
    ])
    .await
    .expect("Failed to ingest");

    let ipinfo = stubs::IpInfoStub::start().await;
    let summary = ctx.geo_sweep(&ipinfo).run().await.unwrap();

    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.enriched, 1);
    assert_eq!(ipinfo.requests(), vec!["203.0.113.9".to_string()]);

    assert_eq!(
        honey_store::count_ip_info_for(&ctx.store, "203.0.113.9")
            .await
            .unwrap(),
        1
    );
}

/// The decode path: a raw delivery with a hostname attribute becomes a
/// normalized event that survives a store round trip.
#[tokio::test]
async fn test_decode_then_persist() {
    let ctx = TestContext::new().await;

    let raw = fixtures::sensor_payload("POST", "/cgi-bin/luci", "198.51.100.23");
    let event = decode_delivery(&fixtures::delivery(&raw, Some("sensor-42")))
        .expect("Failed to decode delivery");

    ctx.ingest(vec![event.clone()]).await.expect("Failed to ingest");

    let stored = honey_store::all_events(&ctx.store, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].event_id, event.event_id);
    assert_eq!(stored[0].honey_pot_name.as_deref(), Some("sensor-42"));
    assert_eq!(stored[0].method.as_deref(), Some("POST"));
    assert_eq!(stored[0].remote_address.as_deref(), Some("198.51.100.23"));
}
