//! Store queries: pending-work discovery plus verification helpers.
//!
//! The two pending queries are the coordination mechanism of the whole
//! pipeline. An event's enrichment progress is observable directly in the
//! data (annotation row present or not), which is what makes the sweeps
//! idempotent and safely restartable after a crash at any point.

use crate::client::StoreClient;
use crate::insert::{DeadLetterRow, EventRow, IpInfoRow, VerdictRow};
use chrono::DateTime;
use honey_core::{Error, HoneyEvent, Result};

/// Distinct origin addresses with no geolocation annotation yet.
///
/// Left-exclusion join on address: a non-matched `ip_info` side surfaces as
/// an empty `ip_address`, mirroring the annotation-is-absent signal. Events
/// with no usable origin address are excluded rather than left to fail a
/// lookup on every sweep.
pub async fn pending_addresses(client: &StoreClient) -> Result<Vec<String>> {
    let addresses: Vec<String> = client
        .inner()
        .query(
            "SELECT DISTINCT assumeNotNull(e.remote_address) \
             FROM honeypot.events AS e \
             LEFT JOIN honeypot.ip_info AS g ON e.remote_address = g.ip_address \
             WHERE g.ip_address = '' \
               AND isNotNull(e.remote_address) \
               AND e.remote_address != ''",
        )
        .fetch_all()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;
    Ok(addresses)
}

/// Events with no classification annotation yet.
///
/// Left-exclusion join on event identity, using an absent maliciousness
/// level as the completion signal: a non-matched verdict side surfaces as an
/// empty `malicious`, and a committed verdict row always carries a non-empty
/// level.
pub async fn pending_events(client: &StoreClient) -> Result<Vec<HoneyEvent>> {
    let rows: Vec<EventRow> = client
        .inner()
        .query(
            "SELECT e.event_id, e.created, e.honey_pot_name, e.time, e.host, \
                    e.method, e.path, e.remote_address, e.user_agent, \
                    e.query_params, e.headers, e.body \
             FROM honeypot.events AS e \
             LEFT JOIN honeypot.llm_verdicts AS v ON e.event_id = v.event_id \
             WHERE v.malicious = ''",
        )
        .fetch_all()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;

    Ok(rows.into_iter().map(event_from_row).collect())
}

fn event_from_row(row: EventRow) -> HoneyEvent {
    HoneyEvent {
        event_id: row.event_id,
        created: DateTime::from_timestamp_millis(row.created).unwrap_or_default(),
        honey_pot_name: row.honey_pot_name,
        time: row.time,
        host: row.host,
        method: row.method,
        path: row.path,
        remote_address: row.remote_address,
        user_agent: row.user_agent,
        query_params: row.query_params,
        headers: row.headers,
        body: row.body,
    }
}

/// Count all captured events (verification).
pub async fn count_events(client: &StoreClient) -> Result<u64> {
    let count: u64 = client
        .inner()
        .query("SELECT count() FROM honeypot.events")
        .fetch_one()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;
    Ok(count)
}

/// Count geolocation annotations for one address (verification).
pub async fn count_ip_info_for(client: &StoreClient, ip_address: &str) -> Result<u64> {
    let count: u64 = client
        .inner()
        .query("SELECT count() FROM honeypot.ip_info WHERE ip_address = ?")
        .bind(ip_address)
        .fetch_one()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;
    Ok(count)
}

/// Fetch the geolocation annotation for one address (verification).
pub async fn ip_info_for(client: &StoreClient, ip_address: &str) -> Result<Option<IpInfoRow>> {
    let row: Option<IpInfoRow> = client
        .inner()
        .query(
            "SELECT ip_address, asn, as_name, as_domain, country_code, country, \
                    continent_code, continent, created \
             FROM honeypot.ip_info WHERE ip_address = ?",
        )
        .bind(ip_address)
        .fetch_optional()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;
    Ok(row)
}

/// Fetch the verdict for one event (verification).
pub async fn verdict_for(client: &StoreClient, event_id: &str) -> Result<Option<VerdictRow>> {
    let row: Option<VerdictRow> = client
        .inner()
        .query(
            "SELECT event_id, malicious, type_of_exploit, target_software, created \
             FROM honeypot.llm_verdicts WHERE event_id = ?",
        )
        .bind(event_id)
        .fetch_optional()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;
    Ok(row)
}

/// Fetch stored events, newest first (verification).
pub async fn all_events(client: &StoreClient, limit: u32) -> Result<Vec<HoneyEvent>> {
    let rows: Vec<EventRow> = client
        .inner()
        .query(
            "SELECT event_id, created, honey_pot_name, time, host, method, path, \
                    remote_address, user_agent, query_params, headers, body \
             FROM honeypot.events ORDER BY created DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;
    Ok(rows.into_iter().map(event_from_row).collect())
}

/// Fetch quarantined payloads, newest first (verification).
pub async fn dead_letters(client: &StoreClient, limit: u32) -> Result<Vec<DeadLetterRow>> {
    let rows: Vec<DeadLetterRow> = client
        .inner()
        .query(
            "SELECT payload, attributes, error, offset, created \
             FROM honeypot.dead_letters ORDER BY created DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all()
        .await
        .map_err(|e| Error::store(format!("query error: {e}")))?;
    Ok(rows)
}

/// Truncate all tables (test cleanup).
pub async fn truncate_all(client: &StoreClient) -> Result<()> {
    for table in [
        "honeypot.events",
        "honeypot.ip_info",
        "honeypot.llm_verdicts",
        "honeypot.consumer_offsets",
        "honeypot.dead_letters",
    ] {
        client
            .inner()
            .query(&format!("TRUNCATE TABLE IF EXISTS {table}"))
            .execute()
            .await
            .map_err(|e| Error::store(format!("truncate error: {e}")))?;
    }
    Ok(())
}
