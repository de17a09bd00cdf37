//! Insert paths for events and annotations.
//!
//! Events are written in batches by the consumer. Annotations are written
//! one row per item so that a sweep failure never rolls back earlier
//! successes; each annotation insert first checks for an existing row so a
//! redundant sweep cannot violate the one-annotation-per-key invariant.

use crate::client::StoreClient;
use clickhouse::Row;
use honey_core::{Error, HoneyEvent, IpInfo, LlmVerdict, Result};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{debug, warn};

/// Event row as stored in `honeypot.events`.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct EventRow {
    pub event_id: String,
    /// DateTime64(3) as milliseconds
    pub created: i64,
    pub honey_pot_name: Option<String>,
    pub time: Option<String>,
    pub host: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub remote_address: Option<String>,
    pub user_agent: Option<String>,
    pub query_params: Option<String>,
    pub headers: Option<String>,
    pub body: Option<String>,
}

impl From<HoneyEvent> for EventRow {
    fn from(event: HoneyEvent) -> Self {
        Self {
            event_id: event.event_id,
            created: event.created.timestamp_millis(),
            honey_pot_name: event.honey_pot_name,
            time: event.time,
            host: event.host,
            method: event.method,
            path: event.path,
            remote_address: event.remote_address,
            user_agent: event.user_agent,
            query_params: event.query_params,
            headers: event.headers,
            body: event.body,
        }
    }
}

/// Annotation row as stored in `honeypot.ip_info`.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct IpInfoRow {
    pub ip_address: String,
    pub asn: Option<String>,
    pub as_name: Option<String>,
    pub as_domain: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub continent_code: Option<String>,
    pub continent: Option<String>,
    pub created: i64,
}

impl From<IpInfo> for IpInfoRow {
    fn from(info: IpInfo) -> Self {
        Self {
            ip_address: info.ip_address,
            asn: info.asn,
            as_name: info.as_name,
            as_domain: info.as_domain,
            country_code: info.country_code,
            country: info.country,
            continent_code: info.continent_code,
            continent: info.continent,
            created: info.created.timestamp_millis(),
        }
    }
}

/// Annotation row as stored in `honeypot.llm_verdicts`.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct VerdictRow {
    pub event_id: String,
    pub malicious: String,
    pub type_of_exploit: Option<String>,
    pub target_software: Option<String>,
    pub created: i64,
}

impl From<LlmVerdict> for VerdictRow {
    fn from(verdict: LlmVerdict) -> Self {
        Self {
            event_id: verdict.event_id,
            malicious: verdict.malicious.as_str().to_string(),
            type_of_exploit: verdict.type_of_exploit,
            target_software: verdict.target_software,
            created: verdict.created.timestamp_millis(),
        }
    }
}

/// Quarantined payload row as stored in `honeypot.dead_letters`.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct DeadLetterRow {
    /// Raw payload bytes, lossily decoded as UTF-8
    pub payload: String,
    /// Message attributes, serialized to JSON text
    pub attributes: String,
    pub error: String,
    pub offset: i64,
    /// DateTime64(3) as milliseconds
    pub created: i64,
}

/// Insert a batch of captured events.
///
/// The consumer acknowledges its deliveries only after this returns Ok.
pub async fn insert_events(client: &StoreClient, events: Vec<HoneyEvent>) -> Result<usize> {
    if events.is_empty() {
        return Ok(0);
    }

    let count = events.len();
    let rows: Vec<EventRow> = events.into_iter().map(EventRow::from).collect();

    let mut insert = client.inner().insert("honeypot.events").map_err(|e| {
        metrics().store_errors.inc();
        Error::store(format!("insert error: {e}"))
    })?;

    for row in &rows {
        insert.write(row).await.map_err(|e| {
            metrics().store_errors.inc();
            Error::store(format!("write error: {e}"))
        })?;
    }

    insert.end().await.map_err(|e| {
        metrics().store_errors.inc();
        Error::store(format!("end error: {e}"))
    })?;

    metrics().store_inserts.inc();
    debug!(count = count, "Inserted events");

    Ok(count)
}

/// Insert one geolocation annotation, whole or not at all.
///
/// Returns false (and writes nothing) when the address already has an
/// annotation, preserving the at-most-one-row-per-address invariant even if
/// two sweep runs race on the same pending set.
pub async fn insert_ip_info(client: &StoreClient, info: IpInfo) -> Result<bool> {
    let existing: u64 = client
        .inner()
        .query("SELECT count() FROM honeypot.ip_info WHERE ip_address = ?")
        .bind(&info.ip_address)
        .fetch_one()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;

    if existing > 0 {
        warn!(ip = %info.ip_address, "Address already annotated, skipping");
        return Ok(false);
    }

    let row = IpInfoRow::from(info);
    write_one(client, "honeypot.ip_info", &row).await?;

    metrics().store_inserts.inc();
    debug!(ip = %row.ip_address, "Inserted geo annotation");

    Ok(true)
}

/// Insert one classification annotation, whole or not at all.
///
/// Returns false (and writes nothing) when the event already has a verdict.
pub async fn insert_verdict(client: &StoreClient, verdict: LlmVerdict) -> Result<bool> {
    let existing: u64 = client
        .inner()
        .query("SELECT count() FROM honeypot.llm_verdicts WHERE event_id = ?")
        .bind(&verdict.event_id)
        .fetch_one()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;

    if existing > 0 {
        warn!(event_id = %verdict.event_id, "Event already classified, skipping");
        return Ok(false);
    }

    let row = VerdictRow::from(verdict);
    write_one(client, "honeypot.llm_verdicts", &row).await?;

    metrics().store_inserts.inc();
    debug!(event_id = %row.event_id, "Inserted verdict");

    Ok(true)
}

/// Quarantine one undecodable payload.
///
/// Called by the consumer before it acknowledges a batch containing a
/// malformed message, so the raw bytes stay recoverable.
pub async fn insert_dead_letter(client: &StoreClient, row: DeadLetterRow) -> Result<()> {
    write_one(client, "honeypot.dead_letters", &row).await?;

    metrics().store_inserts.inc();
    debug!(offset = row.offset, "Quarantined undecodable payload");

    Ok(())
}

pub(crate) async fn write_one<R: Row + Serialize>(
    client: &StoreClient,
    table: &str,
    row: &R,
) -> Result<()> {
    let mut insert = client.inner().insert(table).map_err(|e| {
        metrics().store_errors.inc();
        Error::store(format!("insert error: {e}"))
    })?;

    insert.write(row).await.map_err(|e| {
        metrics().store_errors.inc();
        Error::store(format!("write error: {e}"))
    })?;

    insert.end().await.map_err(|e| {
        metrics().store_errors.inc();
        Error::store(format!("end error: {e}"))
    })?;

    Ok(())
}
