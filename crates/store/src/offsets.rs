//! Durable consumer offsets.
//!
//! An acknowledgment is only real once it outlives the process. The consumer
//! records its committed position here after a batch is persisted and seeks
//! back to the stored position at startup; a crash between the event insert
//! and the offset write replays the batch, which at-least-once ingestion
//! accepts.

use crate::client::StoreClient;
use chrono::Utc;
use clickhouse::Row;
use honey_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Committed-position row as stored in `honeypot.consumer_offsets`.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct OffsetRow {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// DateTime64(3) as milliseconds
    pub updated: i64,
}

/// Records the committed consumer position for one topic partition.
pub async fn save_offset(
    client: &StoreClient,
    topic: &str,
    partition: i32,
    offset: i64,
) -> Result<()> {
    let row = OffsetRow {
        topic: topic.to_string(),
        partition,
        offset,
        updated: Utc::now().timestamp_millis(),
    };

    crate::insert::write_one(client, "honeypot.consumer_offsets", &row).await?;

    debug!(
        topic = topic,
        partition = partition,
        offset = offset,
        "Recorded consumer offset"
    );

    Ok(())
}

/// Loads the last committed position for one topic partition.
///
/// Returns None when no position was ever recorded; the consumer then
/// starts from the latest broker offset.
pub async fn load_offset(
    client: &StoreClient,
    topic: &str,
    partition: i32,
) -> Result<Option<i64>> {
    let offset: Option<i64> = client
        .inner()
        .query(
            "SELECT offset FROM honeypot.consumer_offsets \
             WHERE topic = ? AND partition = ? \
             ORDER BY offset DESC LIMIT 1",
        )
        .bind(topic)
        .bind(partition)
        .fetch_optional()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;

    Ok(offset)
}
