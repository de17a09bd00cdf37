//! Threat-classification verdicts and inference-output validation.
//!
//! Inference output is untrusted structured data. It is validated here
//! before being treated as classification truth, with exactly one documented
//! tolerance: the model sometimes emits the literal string "null" for an
//! optional field instead of a JSON null, and that shape is repaired to an
//! absent value. Every other malformed shape is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maliciousness level of a captured request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Malice {
    High,
    Medium,
    Low,
}

impl Malice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(Error::verdict(format!(
                "malicious must be high, medium or low, got {other:?}"
            ))),
        }
    }
}

/// Inference reply as decoded from the model's content field, before
/// validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVerdict {
    pub malicious: Option<String>,
    pub type_of_exploit: Option<String>,
    pub target_software: Option<String>,
}

/// One validated threat classification for one event.
///
/// `malicious` is never absent once the row exists; its presence is the
/// "already enriched" signal for the classification sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmVerdict {
    pub event_id: String,
    pub malicious: Malice,
    pub type_of_exploit: Option<String>,
    pub target_software: Option<String>,
    pub created: DateTime<Utc>,
}

impl LlmVerdict {
    /// Validates a raw inference reply into a committable verdict.
    pub fn from_raw(
        event_id: impl Into<String>,
        raw: RawVerdict,
        created: DateTime<Utc>,
    ) -> Result<Self> {
        let malicious = match raw.malicious {
            Some(level) => Malice::parse(&level)?,
            None => return Err(Error::verdict("malicious level is missing")),
        };

        Ok(Self {
            event_id: event_id.into(),
            malicious,
            type_of_exploit: normalize_label(raw.type_of_exploit, "type_of_exploit")?,
            target_software: normalize_label(raw.target_software, "target_software")?,
            created,
        })
    }
}

/// Normalizes an optional free-form label from the inference reply.
///
/// The literal word "null" (case-insensitive, after trimming) is coerced to
/// absent. Any other non-empty string is retained verbatim. A string that is
/// empty after trimming is invalid.
fn normalize_label(value: Option<String>, field: &str) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    if trimmed.is_empty() {
        return Err(Error::verdict(format!("{field} is empty after trimming")));
    }

    Ok(Some(value))
}
