//! Geo-enrichment sweep: pending addresses → ipinfo lookup → annotations.
//!
//! One invocation runs to completion with no state carried between
//! invocations. Each address is committed individually so a later failure
//! cannot roll back earlier successes, and a failed address simply stays
//! pending (no annotation row) until the next sweep.

use chrono::Utc;
use honey_core::{Error, IpInfo, Result};
use honey_store::{insert::insert_ip_info, pending_addresses, StoreClient};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::{error, info};

use crate::sweep::SweepSummary;

/// Geolocation lookup service configuration.
#[derive(Debug, Clone)]
pub struct IpInfoConfig {
    /// Lookup service base URL
    pub base_url: String,
    /// API token, required
    pub token: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for IpInfoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.ipinfo.io".to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl IpInfoConfig {
    /// Applies `HONEY_IPINFO_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HONEY_IPINFO_URL") {
            self.base_url = url;
        }
        if let Ok(token) = std::env::var("HONEY_IPINFO_TOKEN") {
            self.token = token;
        }
    }
}

/// Lookup service response body.
///
/// Fields the service omits stay null on the annotation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IpInfoResponse {
    pub asn: Option<String>,
    pub as_name: Option<String>,
    pub as_domain: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub continent_code: Option<String>,
    pub continent: Option<String>,
}

impl IpInfoResponse {
    /// Maps the response into an annotation for the looked-up address.
    pub fn into_annotation(self, ip_address: impl Into<String>) -> IpInfo {
        IpInfo {
            ip_address: ip_address.into(),
            asn: self.asn,
            as_name: self.as_name,
            as_domain: self.as_domain,
            country_code: self.country_code,
            country: self.country,
            continent_code: self.continent_code,
            continent: self.continent,
            created: Utc::now(),
        }
    }
}

/// HTTP client for the ipinfo-style lookup service.
#[derive(Debug)]
pub struct IpInfoClient {
    http: reqwest::Client,
    config: IpInfoConfig,
}

impl IpInfoClient {
    /// Creates a new lookup client. A missing token is a configuration
    /// error and aborts startup.
    pub fn new(config: IpInfoConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(Error::config("HONEY_IPINFO_TOKEN"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Looks up one origin address.
    pub async fn lookup(&self, ip_address: &str) -> Result<IpInfoResponse> {
        let url = format!(
            "{}/lite/{}",
            self.config.base_url.trim_end_matches('/'),
            ip_address
        );

        let response = self
            .http
            .get(&url)
            .query(&[("token", self.config.token.as_str())])
            .send()
            .await
            .map_err(|e| Error::service("ipinfo", e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::service(
                "ipinfo",
                format!("status {} for {}", response.status(), ip_address),
            ));
        }

        response
            .json::<IpInfoResponse>()
            .await
            .map_err(|e| Error::service("ipinfo", format!("malformed payload: {e}")))
    }
}

/// One-shot geo-enrichment sweep.
pub struct GeoSweep {
    store: Arc<StoreClient>,
    client: IpInfoClient,
}

impl GeoSweep {
    pub fn new(store: Arc<StoreClient>, client: IpInfoClient) -> Self {
        Self { store, client }
    }

    /// Runs the sweep to completion and returns the per-run summary.
    ///
    /// Discovery and per-address failure both leave the address pending for
    /// the next invocation; only a committed annotation removes it from the
    /// work set.
    pub async fn run(&self) -> Result<SweepSummary> {
        let pending = pending_addresses(&self.store).await?;
        info!(count = pending.len(), "Found unenriched addresses");

        let mut summary = SweepSummary::new("geo", pending.len());

        for ip_address in pending {
            metrics().geo_lookups.inc();

            match self.enrich_one(&ip_address).await {
                Ok(true) => summary.record_enriched(),
                Ok(false) => summary.record_skipped(),
                Err(e) => {
                    metrics().geo_failures.inc();
                    error!(ip = %ip_address, error = %e, "Failed to enrich address");
                    summary.record_failure(ip_address, &e);
                }
            }
        }

        summary.log();
        Ok(summary)
    }

    /// Lookup and commit for one address. The annotation is written whole
    /// or not at all.
    async fn enrich_one(&self, ip_address: &str) -> Result<bool> {
        let response = self.client.lookup(ip_address).await?;
        let annotation = response.into_annotation(ip_address);
        insert_ip_info(&self.store, annotation).await
    }
}
