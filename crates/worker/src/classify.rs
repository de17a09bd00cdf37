//! Classification sweep: pending events → LLM inference → verdicts.
//!
//! Each pending event is rendered into a fixed textual context, submitted
//! to an Ollama-style chat endpoint under a strict output schema, and the
//! reply is validated (including the documented "null"-literal repair in
//! `honey_core::verdict`) before a verdict row is committed. Per-event
//! failures are absorbed into the sweep summary; the event stays pending.

use chrono::Utc;
use honey_core::{Error, HoneyEvent, LlmVerdict, RawVerdict, Result};
use honey_store::{insert::insert_verdict, pending_events, StoreClient};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::{debug, error, info};

use crate::sweep::SweepSummary;

/// Fixed system instructions for the classification conversation.
const SYSTEM_PROMPT: &str = r#"You are a security analyst classifying HTTP requests captured by a honeypot. Analyze the provided request data strictly based on its content and return a JSON classification.

## Request Data Format
The request will include these fields:
- Method: HTTP method (GET, POST, HEAD, etc.)
- Path: Request path/URI
- User-Agent: User-Agent header
- Query Parameters: Query string parameters (JSON object)
- Headers: HTTP headers (JSON object)
- Body: Request body (if POST, PUT, etc.)

## Classification Guidelines

### malicious (required)
Classify the overall maliciousness level based on the request's characteristics:
- high: Requests containing clear, active exploit payloads (SQL injection syntax, command execution attempts, cross-site scripting vectors, path traversal sequences, deserialization payloads, etc.) designed to compromise or manipulate the target system.
- medium: Suspicious reconnaissance such as scanning for administrative interfaces, configuration files, or common vulnerability paths (like /admin, /setup.php, /config.json), directory listing attempts, or automated generic probing without specific exploit payloads.
- low: Automated scanning by legitimate crawlers (search engines, security researchers identified by User-Agent and behavior), benign checks, or other non-malicious activity.

### type_of_exploit (null if none detected)
Identify the specific exploit type ONLY if a clear, identifiable exploit payload or technique is present within the request data (path, query parameters, body, or headers). Do not guess the exploit type based solely on the target path if no payload is present.
Respond with the JSON null type, not the string "null", if you leave this null.
Examples: "SQL Injection", "Cross-Site Scripting", "Remote Code Execution", "Command Injection", "Path Traversal", "Server-Side Request Forgery", "Information Disclosure", "Authentication Bypass", "File Inclusion", "Deserialization".

### target_software (null if unknown)
Identify the likely target software ONLY if highly confident based on specific paths, payloads, or headers characteristic of certain software or frameworks.
Respond with the JSON null type, not the string "null", if you leave this null.
Examples: "WordPress", "Apache", "nginx", "PHPMyAdmin", "Joomla", "Spring Framework", "Jenkins", "Struts", "IIS".

Respond with a raw JSON string and nothing else. Do not add triple backticks to the response.

# Example Response for Active Exploit
{
  "malicious": "high",
  "type_of_exploit": "SQL Injection",
  "target_software": "WordPress"
}

# Example Response for Reconnaissance/Probing
{
  "malicious": "medium",
  "type_of_exploit": null,
  "target_software": "PHPMyAdmin"
}

# Example Response for Low Maliciousness
{
  "malicious": "low",
  "type_of_exploit": null,
  "target_software": null
}"#;

/// JSON schema constraining the inference output.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "malicious": {
                "type": "string",
                "enum": ["high", "medium", "low"]
            },
            "type_of_exploit": {
                "type": ["string", "null"]
            },
            "target_software": {
                "type": ["string", "null"]
            }
        },
        "required": ["malicious"]
    })
}

/// Inference service configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat endpoint base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "gemma3".to_string(),
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Applies `HONEY_OLLAMA_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("HONEY_OLLAMA_URL") {
            self.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("HONEY_OLLAMA_MODEL") {
            self.model = model;
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// HTTP client for the Ollama-style chat endpoint.
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Submits one rendered request context for classification.
    ///
    /// The conversation is two roles: the fixed system instructions plus
    /// the per-event context, constrained by the output schema.
    pub async fn classify(&self, context: &str) -> Result<RawVerdict> {
        let url = format!(
            "{}/api/chat",
            self.config.endpoint.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": context}
            ],
            "format": response_schema(),
            "stream": false
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::service("inference", e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::service(
                "inference",
                format!("status {}", response.status()),
            ));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::service("inference", format!("malformed reply: {e}")))?;

        parse_reply(&reply.message.content)
    }
}

/// Parses the model's content field into a raw verdict.
///
/// The content is untrusted: anything that is not a JSON document of the
/// expected shape is rejected here, before validation even starts.
pub fn parse_reply(content: &str) -> Result<RawVerdict> {
    serde_json::from_str(content)
        .map_err(|e| Error::verdict(format!("reply is not a verdict document: {e}")))
}

/// One-shot classification sweep.
pub struct ClassifySweep {
    store: Arc<StoreClient>,
    client: LlmClient,
}

impl ClassifySweep {
    pub fn new(store: Arc<StoreClient>, client: LlmClient) -> Self {
        Self { store, client }
    }

    /// Runs the sweep to completion and returns the per-run summary.
    pub async fn run(&self) -> Result<SweepSummary> {
        let pending = pending_events(&self.store).await?;
        info!(count = pending.len(), "Found unclassified events");

        let mut summary = SweepSummary::new("classify", pending.len());

        for event in pending {
            let event_id = event.event_id.clone();

            match self.enrich_one(event).await {
                Ok(true) => {
                    metrics().verdicts_recorded.inc();
                    summary.record_enriched();
                }
                Ok(false) => summary.record_skipped(),
                Err(e) => {
                    metrics().classify_failures.inc();
                    error!(event_id = %event_id, error = %e, "Failed to classify event");
                    summary.record_failure(event_id, &e);
                }
            }
        }

        summary.log();
        Ok(summary)
    }

    /// Inference, validation, and commit for one event.
    async fn enrich_one(&self, event: HoneyEvent) -> Result<bool> {
        let context = event.llm_context();
        debug!(event_id = %event.event_id, "Submitting event for classification");

        let raw = self.client.classify(&context).await?;
        let verdict = LlmVerdict::from_raw(event.event_id, raw, Utc::now())?;

        insert_verdict(&self.store, verdict).await
    }
}
