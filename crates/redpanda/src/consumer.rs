//! Redpanda consumer delivering raw sensor messages.
//!
//! Uses rskafka with manual offset management: a fetched batch is only
//! committed after the ingestion worker has persisted every decoded event,
//! which gives at-least-once ingestion semantics. Message payloads stay
//! opaque bytes here; decoding is the consumer worker's job.

use crate::config::RedpandaConfig;
use honey_core::{Error, Result};
use rskafka::client::{
    partition::{OffsetAt, UnknownTopicHandling},
    ClientBuilder, Credentials, SaslConfig,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Creates a TLS configuration for Redpanda Cloud.
fn create_tls_config() -> Arc<rustls::ClientConfig> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

/// Offset tracking for manual commit.
#[derive(Debug, Clone, Copy)]
pub struct Offset {
    pub partition: i32,
    pub offset: i64,
}

/// One raw delivered message: opaque payload bytes plus string attributes
/// carried as record headers.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub payload: Vec<u8>,
    pub attributes: BTreeMap<String, String>,
    pub offset: i64,
}

impl Delivery {
    /// Returns a message attribute by name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Consumer for reading raw sensor messages from Redpanda.
pub struct Consumer {
    config: RedpandaConfig,
    /// Partition client (currently only partition 0)
    partition_client: RwLock<Option<Arc<rskafka::client::partition::PartitionClient>>>,
    /// Current offset (next offset to read)
    current_offset: AtomicI64,
    /// Whether the start offset has been established
    initialized: AtomicBool,
}

impl Consumer {
    /// Creates a new consumer. Connection is established lazily.
    pub fn new(config: RedpandaConfig) -> Self {
        info!(
            group_id = %config.consumer.group_id,
            topic = %config.topic,
            batch_size = config.consumer.batch_size,
            "Creating Redpanda consumer"
        );

        Self {
            config,
            partition_client: RwLock::new(None),
            current_offset: AtomicI64::new(-1),
            initialized: AtomicBool::new(false),
        }
    }

    /// Initializes the consumer connection.
    async fn ensure_connected(&self) -> Result<Arc<rskafka::client::partition::PartitionClient>> {
        {
            let client = self.partition_client.read().await;
            if let Some(ref c) = *client {
                return Ok(c.clone());
            }
        }

        let connection = self.config.broker_string();
        let mut builder = ClientBuilder::new(vec![connection]);

        // TLS and SASL auth for Redpanda Cloud
        if let (Some(username), Some(password)) =
            (&self.config.sasl_username, &self.config.sasl_password)
        {
            builder = builder
                .tls_config(create_tls_config())
                .sasl_config(SaslConfig::ScramSha256(Credentials::new(
                    username.clone(),
                    password.clone(),
                )));
        }

        let client = builder
            .build()
            .await
            .map_err(|e| Error::queue(format!("failed to connect to Redpanda: {e}")))?;

        let partition_client = client
            .partition_client(self.config.topic.clone(), 0, UnknownTopicHandling::Error)
            .await
            .map_err(|e| Error::queue(format!("failed to get partition client: {e}")))?;

        let partition_client = Arc::new(partition_client);

        if !self.initialized.load(Ordering::SeqCst) {
            // No stored position was restored via seek; start from the
            // latest broker offset.
            let offset = partition_client
                .get_offset(OffsetAt::Latest)
                .await
                .map_err(|e| Error::queue(format!("failed to get offset: {e}")))?;

            self.current_offset.store(offset, Ordering::SeqCst);
            self.initialized.store(true, Ordering::SeqCst);

            info!(
                topic = %self.config.topic,
                partition = 0,
                offset = offset,
                "Consumer initialized at offset"
            );
        }

        {
            let mut client_guard = self.partition_client.write().await;
            *client_guard = Some(partition_client.clone());
        }

        Ok(partition_client)
    }

    /// Fetches a batch of raw deliveries from Redpanda.
    ///
    /// Blocks until messages are available or the batch timeout expires.
    /// Returns the deliveries and the offset to commit after processing.
    pub async fn fetch_batch(&self) -> Result<(Vec<Delivery>, Option<Offset>)> {
        let client = self.ensure_connected().await?;

        let timeout = Duration::from_millis(self.config.consumer.batch_timeout_ms);
        let max_bytes = self.config.consumer.batch_size * 64 * 1024; // ~64KB max per message

        let current = self.current_offset.load(Ordering::SeqCst);

        let (records, _watermark) = client
            .fetch_records(current, 1..max_bytes as i32, timeout.as_millis() as i32)
            .await
            .map_err(|e| {
                error!("Fetch error: {}", e);
                Error::queue(format!("failed to fetch records: {e}"))
            })?;

        if records.is_empty() {
            return Ok((Vec::new(), None));
        }

        let mut deliveries = Vec::with_capacity(records.len());
        let mut max_offset = current;

        for record in records {
            max_offset = record.offset.max(max_offset);

            if let Some(value) = record.record.value {
                let attributes = record
                    .record
                    .headers
                    .into_iter()
                    .map(|(k, v)| (k, String::from_utf8_lossy(&v).into_owned()))
                    .collect();

                deliveries.push(Delivery {
                    payload: value,
                    attributes,
                    offset: record.offset,
                });
            }
        }

        debug!(
            deliveries = deliveries.len(),
            offset_start = current,
            offset_end = max_offset,
            "Fetched batch from Redpanda"
        );

        // Offset to commit: next offset after the last record
        let commit_offset = if max_offset > current || !deliveries.is_empty() {
            Some(Offset {
                partition: 0,
                offset: max_offset + 1,
            })
        } else {
            None
        };

        Ok((deliveries, commit_offset))
    }

    /// Seeks to a previously committed offset.
    ///
    /// Must be called before the first fetch; it overrides the
    /// latest-offset default used when no position was ever stored.
    pub fn seek(&self, offset: i64) {
        self.current_offset.store(offset, Ordering::SeqCst);
        self.initialized.store(true, Ordering::SeqCst);
        info!(offset = offset, "Consumer position restored");
    }

    /// Advances the in-memory consumer position; fetches resume from here.
    ///
    /// The caller acks a batch by durably recording the offset first and
    /// then calling this. A batch whose events did not reach the store is
    /// never committed, so it is fetched again.
    pub async fn commit(&self, offset: Offset) -> Result<()> {
        let prev = self.current_offset.swap(offset.offset, Ordering::SeqCst);

        debug!(
            partition = offset.partition,
            prev_offset = prev,
            new_offset = offset.offset,
            "Committed offset"
        );

        Ok(())
    }

    /// Returns the current consumer offset.
    pub fn current_offset(&self) -> i64 {
        self.current_offset.load(Ordering::SeqCst)
    }

    /// Returns the consumer configuration.
    pub fn config(&self) -> &RedpandaConfig {
        &self.config
    }

    /// Resets the connection (for error recovery).
    pub async fn reset_connection(&self) {
        let mut client = self.partition_client.write().await;
        *client = None;
        info!("Consumer connection reset");
    }
}
