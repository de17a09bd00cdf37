//! In-process pipeline counters.
//!
//! Counters are collected in memory and logged: the consumer logs a
//! snapshot at shutdown, the sweeps fold counts into their end-of-run
//! summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Pipeline-wide counters.
#[derive(Debug)]
pub struct PipelineMetrics {
    /// Events normalized and handed to the store by the consumer
    pub events_ingested: Counter,
    /// Message payloads that failed to decode
    pub decode_failures: Counter,
    /// Successful store inserts (events and annotations)
    pub store_inserts: Counter,
    /// Failed store inserts
    pub store_errors: Counter,
    /// Geolocation lookups attempted
    pub geo_lookups: Counter,
    /// Geolocation lookups that failed
    pub geo_failures: Counter,
    /// Verdicts validated and committed
    pub verdicts_recorded: Counter,
    /// Classification attempts that failed (service or schema)
    pub classify_failures: Counter,
}

impl PipelineMetrics {
    pub const fn new() -> Self {
        Self {
            events_ingested: Counter::new(),
            decode_failures: Counter::new(),
            store_inserts: Counter::new(),
            store_errors: Counter::new(),
            geo_lookups: Counter::new(),
            geo_failures: Counter::new(),
            verdicts_recorded: Counter::new(),
            classify_failures: Counter::new(),
        }
    }

    /// Takes a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_ingested: self.events_ingested.get(),
            decode_failures: self.decode_failures.get(),
            store_inserts: self.store_inserts.get(),
            store_errors: self.store_errors.get(),
            geo_lookups: self.geo_lookups.get(),
            geo_failures: self.geo_failures.get(),
            verdicts_recorded: self.verdicts_recorded.get(),
            classify_failures: self.classify_failures.get(),
        }
    }
}

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_ingested: u64,
    pub decode_failures: u64,
    pub store_inserts: u64,
    pub store_errors: u64,
    pub geo_lookups: u64,
    pub geo_failures: u64,
    pub verdicts_recorded: u64,
    pub classify_failures: u64,
}

static METRICS: PipelineMetrics = PipelineMetrics::new();

/// Returns the global metrics registry.
pub fn metrics() -> &'static PipelineMetrics {
    &METRICS
}
