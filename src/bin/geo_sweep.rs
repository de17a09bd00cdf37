//! Geo-enrichment sweep
//!
//! One-shot batch process: finds every distinct origin address without a
//! geolocation annotation, looks each one up against the ipinfo service,
//! and commits one annotation row per address. Scheduling is external
//! (cron or equivalent); each run re-derives its work set from the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use honey_store::{health as store_health, ClickHouseConfig, StoreClient};
use telemetry::init_tracing_from_env;
use worker::{GeoSweep, IpInfoClient, IpInfoConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_from_env();

    info!("Starting geo-enrichment sweep v{}", env!("CARGO_PKG_VERSION"));

    let mut clickhouse = ClickHouseConfig::default();
    clickhouse.apply_env_overrides();

    let mut ipinfo = IpInfoConfig::default();
    ipinfo.apply_env_overrides();

    let store = Arc::new(
        StoreClient::new(clickhouse).context("Failed to create ClickHouse client")?,
    );

    store_health::init_schema(&store)
        .await
        .context("Failed to initialize ClickHouse schema")?;

    let client = IpInfoClient::new(ipinfo).context("ipinfo client configuration")?;

    let summary = GeoSweep::new(store, client)
        .run()
        .await
        .context("Geo-enrichment sweep failed")?;

    info!(
        enriched = summary.enriched,
        failed = summary.failed(),
        "Geo-enrichment sweep complete"
    );

    Ok(())
}
