//! Ingestion consumer worker: Redpanda → event store.
//!
//! Pipeline per batch:
//! 1. Fetch raw deliveries from Redpanda
//! 2. Decode and normalize each payload into a HoneyEvent
//! 3. Persist the events (undecodable payloads go to the dead-letter table)
//! 4. Record the offset durably, then advance the consumer (the ack)
//!
//! A store failure leaves the offset unrecorded so the batch is redelivered,
//! on this run or after a restart; duplicate rows from redelivery are
//! accepted (no dedup key). At startup the worker seeks the consumer back to
//! the last durably recorded offset.

use chrono::Utc;
use honey_core::{Error, HoneyEvent, IngestPayload, Result};
use honey_store::{
    insert::{insert_dead_letter, DeadLetterRow},
    offsets::{load_offset, save_offset},
    StoreClient,
};
use redpanda::{Consumer, Delivery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::{debug, error, info, warn};

/// Ingestion worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestWorkerConfig {
    /// Maximum retries for store insert failures, within the ack window
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff between retries in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    100
}

impl Default for IngestWorkerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Worker that consumes sensor messages and persists them as events.
pub struct IngestWorker {
    consumer: Arc<Consumer>,
    store: Arc<StoreClient>,
    config: IngestWorkerConfig,
}

impl IngestWorker {
    /// Creates a new ingestion worker.
    pub fn new(consumer: Arc<Consumer>, store: Arc<StoreClient>) -> Self {
        Self {
            consumer,
            store,
            config: IngestWorkerConfig::default(),
        }
    }

    /// Creates a new ingestion worker with custom config.
    pub fn with_config(
        consumer: Arc<Consumer>,
        store: Arc<StoreClient>,
        config: IngestWorkerConfig,
    ) -> Self {
        Self {
            consumer,
            store,
            config,
        }
    }

    /// Seeks the consumer to the last durably recorded offset, if any.
    ///
    /// With no stored position the consumer starts from the latest broker
    /// offset on first connect.
    pub async fn restore_position(&self) -> Result<()> {
        let topic = self.consumer.config().topic.clone();

        if let Some(offset) = load_offset(&self.store, &topic, 0).await? {
            self.consumer.seek(offset);
            info!(topic = %topic, offset = offset, "Resuming from stored offset");
        } else {
            info!(topic = %topic, "No stored offset, starting from latest");
        }

        Ok(())
    }

    /// Main run loop - restore position, then fetch, persist, commit.
    pub async fn run(&self) -> Result<()> {
        info!(
            topic = %self.consumer.config().topic,
            group_id = %self.consumer.config().consumer.group_id,
            "Ingestion worker starting"
        );

        self.restore_position().await?;

        loop {
            match self.process_batch().await {
                Ok(count) => {
                    if count > 0 {
                        debug!(count = count, "Processed batch");
                    }
                }
                Err(e) => {
                    error!("Batch processing error: {}", e);
                    // Brief pause, then reconnect; the unrecorded offset
                    // means the batch will be redelivered.
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    self.consumer.reset_connection().await;
                }
            }
        }
    }

    /// Processes a single batch: fetch → persist → record offset → commit.
    async fn process_batch(&self) -> Result<usize> {
        let (deliveries, offset) = self.consumer.fetch_batch().await?;

        if deliveries.is_empty() {
            return Ok(0);
        }

        let count = self.process_deliveries(&deliveries).await?;

        // The ack: durable offset first, in-memory position second. A crash
        // in between replays the batch, which at-least-once accepts.
        if let Some(offset) = offset {
            save_offset(
                &self.store,
                &self.consumer.config().topic,
                offset.partition,
                offset.offset,
            )
            .await?;
            self.consumer.commit(offset).await?;
        }

        Ok(count)
    }

    /// Decodes and persists one batch of raw deliveries.
    ///
    /// Undecodable payloads are quarantined to the dead-letter table rather
    /// than dropped; a quarantine failure fails the whole batch so nothing
    /// is acked and the delivery comes back. Returns the number of events
    /// persisted.
    pub async fn process_deliveries(&self, deliveries: &[Delivery]) -> Result<usize> {
        let mut events = Vec::with_capacity(deliveries.len());
        for delivery in deliveries {
            match decode_delivery(delivery) {
                Ok(event) => events.push(event),
                Err(e) => {
                    metrics().decode_failures.inc();
                    warn!(
                        offset = delivery.offset,
                        error = %e,
                        "Quarantining undecodable payload"
                    );
                    self.quarantine(delivery, &e).await?;
                }
            }
        }

        let count = events.len();
        self.insert_with_retry(events).await?;

        metrics().events_ingested.inc_by(count as u64);

        Ok(count)
    }

    /// Writes one undecodable payload to the dead-letter table.
    async fn quarantine(&self, delivery: &Delivery, cause: &Error) -> Result<()> {
        let row = DeadLetterRow {
            payload: String::from_utf8_lossy(&delivery.payload).into_owned(),
            attributes: serde_json::to_string(&delivery.attributes)?,
            error: cause.to_string(),
            offset: delivery.offset,
            created: Utc::now().timestamp_millis(),
        };

        insert_dead_letter(&self.store, row).await
    }

    /// Inserts events with bounded retries inside the ack window.
    async fn insert_with_retry(&self, events: Vec<HoneyEvent>) -> Result<usize> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff =
                    Duration::from_millis(self.config.retry_backoff_ms * attempt as u64);
                warn!(
                    attempt = attempt,
                    backoff_ms = %backoff.as_millis(),
                    "Retrying store insert"
                );
                tokio::time::sleep(backoff).await;
            }

            match honey_store::insert::insert_events(&self.store, events.clone()).await {
                Ok(count) => return Ok(count),
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal("insert failed with unknown error")))
    }
}

/// Decodes one raw delivery into a storable event.
///
/// Capture timestamp is assigned here, at ingest time; the sensor name comes
/// from the `hostname` message attribute and is null when absent.
pub fn decode_delivery(delivery: &Delivery) -> Result<HoneyEvent> {
    let payload: IngestPayload = serde_json::from_slice(&delivery.payload)
        .map_err(|e| Error::decode(format!("payload is not a sensor event: {e}")))?;

    let honey_pot_name = delivery.attribute("hostname").map(str::to_string);

    Ok(HoneyEvent::from_payload(payload, honey_pot_name, Utc::now()))
}
