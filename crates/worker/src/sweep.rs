//! Per-item sweep results and end-of-run accounting.
//!
//! A sweep absorbs every per-item failure into an explicit value instead of
//! letting it propagate: the item stays pending in the store and is retried
//! structurally by the next sweep invocation.

use honey_core::Error;
use tracing::{info, warn};

/// One failed sweep item, kept for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct SweepFailure {
    /// The offending key (origin address or event id)
    pub key: String,
    pub reason: String,
}

/// Outcome of one sweep invocation.
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub job: &'static str,
    /// Pending items discovered at sweep start
    pub discovered: usize,
    /// Items annotated by this run
    pub enriched: usize,
    /// Items skipped because an annotation already existed
    pub skipped: usize,
    pub failures: Vec<SweepFailure>,
}

impl SweepSummary {
    pub fn new(job: &'static str, discovered: usize) -> Self {
        Self {
            job,
            discovered,
            enriched: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_enriched(&mut self) {
        self.enriched += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, key: impl Into<String>, error: &Error) {
        self.failures.push(SweepFailure {
            key: key.into(),
            reason: error.to_string(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Logs the sweep outcome, one warning per failed key.
    pub fn log(&self) {
        info!(
            job = self.job,
            discovered = self.discovered,
            enriched = self.enriched,
            skipped = self.skipped,
            failed = self.failed(),
            "Sweep finished"
        );

        for failure in &self.failures {
            warn!(
                job = self.job,
                key = %failure.key,
                reason = %failure.reason,
                "Item left pending for the next sweep"
            );
        }
    }
}
