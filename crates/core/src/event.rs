//! Captured honeypot request records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire payload delivered by a honeypot sensor.
///
/// Every field is optional: sensors report whatever they captured and the
/// consumer stores the record as-is. `query_params` and `headers` arrive as
/// structured JSON blobs and are serialized to canonical text before
/// storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestPayload {
    pub time: Option<String>,
    pub host: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub remote_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub query_params: Option<serde_json::Value>,
    #[serde(default)]
    pub headers: Option<serde_json::Value>,
    pub body: Option<String>,
}

/// One stored honeypot-captured HTTP request.
///
/// Created exactly once per delivered message, never updated, never deleted.
/// `event_id` is opaque and immutable once assigned; `created` is the
/// capture timestamp assigned by the consumer at ingest time, not by the
/// sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoneyEvent {
    pub event_id: String,
    pub created: DateTime<Utc>,
    /// Sensor name, taken from the message `hostname` attribute.
    pub honey_pot_name: Option<String>,
    pub time: Option<String>,
    pub host: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub remote_address: Option<String>,
    pub user_agent: Option<String>,
    /// Query parameters, serialized to canonical JSON text.
    pub query_params: Option<String>,
    /// Request headers, serialized to canonical JSON text.
    pub headers: Option<String>,
    pub body: Option<String>,
}

impl HoneyEvent {
    /// Normalizes a decoded sensor payload into a storable record.
    pub fn from_payload(
        payload: IngestPayload,
        honey_pot_name: Option<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            created,
            honey_pot_name,
            time: payload.time,
            host: payload.host,
            method: payload.method,
            path: payload.path,
            remote_address: payload.remote_address,
            user_agent: payload.user_agent,
            query_params: payload.query_params.map(|v| v.to_string()),
            headers: payload.headers.map(|v| v.to_string()),
            body: payload.body,
        }
    }

    /// Renders the fixed textual context submitted to the inference service.
    pub fn llm_context(&self) -> String {
        fn field(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("")
        }

        format!(
            "Method: {}\nPath: {}\nUser-Agent: {}\nQuery Parameters: {}\nHeaders: {}\nBody: {}",
            field(&self.method),
            field(&self.path),
            field(&self.user_agent),
            field(&self.query_params),
            field(&self.headers),
            field(&self.body),
        )
    }
}
