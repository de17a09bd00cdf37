//! Integration test harness for the honeypot pipeline.
//!
//! Real ClickHouse via testcontainers; the external enrichment services
//! (ipinfo, LLM inference) are in-process stub HTTP servers.

pub mod containers;
pub mod fixtures;
pub mod stubs;
