//! ClickHouse configuration.

use serde::{Deserialize, Serialize};

/// ClickHouse client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickHouseConfig {
    /// ClickHouse HTTP URL
    pub url: String,
    /// Database name
    #[serde(default = "default_database")]
    pub database: String,
    /// Username (optional)
    pub username: Option<String>,
    /// Password (optional)
    pub password: Option<String>,
}

fn default_database() -> String {
    "honeypot".to_string()
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            database: default_database(),
            username: None,
            password: None,
        }
    }
}

impl ClickHouseConfig {
    /// Applies `HONEY_CLICKHOUSE_*` environment overrides.
    ///
    /// The config crate's nested parsing doesn't work reliably with
    /// underscored field names, so the store settings are read explicitly.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HONEY_CLICKHOUSE_URL") {
            self.url = url;
        }
        if let Ok(database) = std::env::var("HONEY_CLICKHOUSE_DATABASE") {
            self.database = database;
        }
        if let Ok(username) = std::env::var("HONEY_CLICKHOUSE_USERNAME") {
            self.username = Some(username);
        }
        if let Ok(password) = std::env::var("HONEY_CLICKHOUSE_PASSWORD") {
            self.password = Some(password);
        }
    }
}
