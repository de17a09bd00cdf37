//! ClickHouse table schemas.
//!
//! Three tables: captured events plus two annotation tables keyed back to
//! the source data. ClickHouse has no declarative UNIQUE or FOREIGN KEY
//! constraints; the at-most-one-annotation invariants are enforced by the
//! sweeps (only un-annotated keys are discovered) and by an existence check
//! in the annotation insert path.

/// SQL for creating the events table.
///
/// One row per delivered sensor message. Rows are never updated or deleted
/// by the pipeline.
pub const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS honeypot.events (
    event_id String,
    created DateTime64(3),
    honey_pot_name Nullable(String),
    time Nullable(String),
    host Nullable(String),
    method Nullable(String),
    path Nullable(String),
    remote_address Nullable(String),
    user_agent Nullable(String),
    query_params Nullable(String),
    headers Nullable(String),
    body Nullable(String)
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(created)
ORDER BY (created, event_id)
SETTINGS index_granularity = 8192
"#;

/// SQL for creating the ip_info table.
///
/// One geolocation annotation per distinct origin address. Absence of a row
/// for an address is the "not yet enriched" signal for the geo sweep.
pub const CREATE_IP_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS honeypot.ip_info (
    ip_address String,
    asn Nullable(String),
    as_name Nullable(String),
    as_domain Nullable(String),
    country_code Nullable(String),
    country Nullable(String),
    continent_code Nullable(String),
    continent Nullable(String),
    created DateTime64(3)
)
ENGINE = MergeTree()
ORDER BY ip_address
SETTINGS index_granularity = 8192
"#;

/// SQL for creating the llm_verdicts table.
///
/// One classification annotation per event. `malicious` is never empty once
/// the row exists; a missing/empty level is the "not yet enriched" signal
/// for the classification sweep.
pub const CREATE_LLM_VERDICTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS honeypot.llm_verdicts (
    event_id String,
    malicious LowCardinality(String),
    type_of_exploit Nullable(String),
    target_software Nullable(String),
    created DateTime64(3)
)
ENGINE = MergeTree()
ORDER BY event_id
SETTINGS index_granularity = 8192
"#;

/// SQL for creating the consumer_offsets table.
///
/// One row per committed consumer position. The consumer writes its offset
/// here after persisting a batch and seeks back to the stored position at
/// startup, which is what makes the ack durable across restarts.
pub const CREATE_CONSUMER_OFFSETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS honeypot.consumer_offsets (
    topic String,
    partition Int32,
    offset Int64,
    updated DateTime64(3)
)
ENGINE = ReplacingMergeTree(updated)
ORDER BY (topic, partition)
SETTINGS index_granularity = 8192
"#;

/// SQL for creating the dead_letters table.
///
/// Raw payloads that could not be decoded, kept with the decode error so
/// delivery-layer failures stay inspectable and recoverable instead of
/// vanishing into a log line.
pub const CREATE_DEAD_LETTERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS honeypot.dead_letters (
    payload String,
    attributes String,
    error String,
    offset Int64,
    created DateTime64(3)
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(created)
ORDER BY created
SETTINGS index_granularity = 8192
"#;

/// SQL for creating the database.
pub const CREATE_DATABASE: &str = r#"
CREATE DATABASE IF NOT EXISTS honeypot
"#;

/// All schema statements, in creation order.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        CREATE_DATABASE,
        CREATE_EVENTS_TABLE,
        CREATE_IP_INFO_TABLE,
        CREATE_LLM_VERDICTS_TABLE,
        CREATE_CONSUMER_OFFSETS_TABLE,
        CREATE_DEAD_LETTERS_TABLE,
    ]
}
