//! Workers for the honeypot pipeline.
//!
//! - Ingestion consumer (Redpanda → event store, ack after persist)
//! - Geo-enrichment sweep (pending addresses → ipinfo lookup → annotations)
//! - Classification sweep (pending events → LLM inference → verdicts)
//!
//! The sweeps are one-shot batch passes: each invocation re-derives its
//! work set from the store and holds no state between invocations.

pub mod classify;
pub mod geo;
pub mod ingest;
pub mod sweep;

pub use classify::{ClassifySweep, LlmClient, LlmConfig};
pub use geo::{GeoSweep, IpInfoClient, IpInfoConfig};
pub use ingest::{IngestWorker, IngestWorkerConfig};
pub use sweep::{SweepFailure, SweepSummary};
