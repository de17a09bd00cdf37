//! ClickHouse event store for the honeypot pipeline.
//!
//! The store doubles as the work-discovery substrate: enrichment sweeps
//! find pending items by querying for event rows that lack an annotation
//! row, so no separate task queue exists anywhere in the system.

pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod offsets;
pub mod query;
pub mod schema;

pub use client::*;
pub use config::*;
pub use query::*;
