//! Classification sweep
//!
//! One-shot batch process: finds every event without a verdict, submits
//! each to the LLM inference endpoint under a strict output schema, and
//! commits one verdict row per event. Scheduling is external (cron or
//! equivalent); each run re-derives its work set from the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use honey_store::{health as store_health, ClickHouseConfig, StoreClient};
use telemetry::init_tracing_from_env;
use worker::{ClassifySweep, LlmClient, LlmConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_from_env();

    info!("Starting classification sweep v{}", env!("CARGO_PKG_VERSION"));

    let mut clickhouse = ClickHouseConfig::default();
    clickhouse.apply_env_overrides();

    let mut llm = LlmConfig::default();
    llm.apply_env_overrides();

    info!(endpoint = %llm.endpoint, model = %llm.model, "Loaded inference config");

    let store = Arc::new(
        StoreClient::new(clickhouse).context("Failed to create ClickHouse client")?,
    );

    store_health::init_schema(&store)
        .await
        .context("Failed to initialize ClickHouse schema")?;

    let client = LlmClient::new(llm).context("inference client configuration")?;

    let summary = ClassifySweep::new(store, client)
        .run()
        .await
        .context("Classification sweep failed")?;

    info!(
        enriched = summary.enriched,
        failed = summary.failed(),
        "Classification sweep complete"
    );

    Ok(())
}
