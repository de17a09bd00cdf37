//! Redpanda (Kafka-compatible) subscription client for the honeypot
//! pipeline.
//!
//! Delivers raw sensor messages (payload bytes plus string attributes) to
//! the ingestion consumer. Offsets are committed manually, after the store
//! write, for at-least-once delivery.

pub mod config;
pub mod consumer;
pub mod health;

pub use config::*;
pub use consumer::*;
