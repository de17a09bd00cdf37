//! Internal telemetry for the honeypot pipeline.
//!
//! Structured logging via tracing, in-process counters for the consumer and
//! sweep processes, and a small component health registry checked at
//! startup.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
