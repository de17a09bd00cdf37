//! Core types for the honeypot ingestion and enrichment pipeline.

pub mod error;
pub mod event;
pub mod geo;
pub mod verdict;

pub use error::{Error, Result};
pub use event::{HoneyEvent, IngestPayload};
pub use geo::IpInfo;
pub use verdict::{LlmVerdict, Malice, RawVerdict};
