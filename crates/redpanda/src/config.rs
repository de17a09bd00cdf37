//! Redpanda configuration.

use serde::{Deserialize, Serialize};

/// Redpanda connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedpandaConfig {
    /// Broker addresses
    pub brokers: Vec<String>,
    /// Topic carrying raw sensor messages
    #[serde(default = "default_topic")]
    pub topic: String,
    /// SASL username (for cloud authentication)
    pub sasl_username: Option<String>,
    /// SASL password (for cloud authentication)
    pub sasl_password: Option<String>,
    #[serde(default)]
    pub consumer: ConsumerConfig,
}

/// Consumer-side tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Consumer group identifier
    #[serde(default = "default_group_id")]
    pub group_id: String,
    /// Maximum messages per fetch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fetch wait timeout in milliseconds
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
}

fn default_topic() -> String {
    "honey-events".to_string()
}

fn default_group_id() -> String {
    "honey-consumer".to_string()
}

fn default_batch_size() -> usize {
    500
}

fn default_batch_timeout_ms() -> u64 {
    1000
}

impl Default for RedpandaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topic: default_topic(),
            sasl_username: None,
            sasl_password: None,
            consumer: ConsumerConfig::default(),
        }
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            batch_size: default_batch_size(),
            batch_timeout_ms: default_batch_timeout_ms(),
        }
    }
}

impl RedpandaConfig {
    /// Returns the broker list as a comma-separated string.
    pub fn broker_string(&self) -> String {
        self.brokers.join(",")
    }

    /// Applies `HONEY_REDPANDA_*` environment overrides.
    ///
    /// The config crate's nested parsing doesn't work reliably with
    /// underscored field names, so the queue settings are read explicitly.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(brokers) = std::env::var("HONEY_REDPANDA_BROKERS") {
            self.brokers = brokers.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(topic) = std::env::var("HONEY_REDPANDA_TOPIC") {
            self.topic = topic;
        }
        if let Ok(username) = std::env::var("HONEY_REDPANDA_SASL_USERNAME") {
            self.sasl_username = Some(username);
        }
        if let Ok(password) = std::env::var("HONEY_REDPANDA_SASL_PASSWORD") {
            self.sasl_password = Some(password);
        }
    }
}
