//! Honeypot ingestion consumer
//!
//! Long-running pipeline entry point:
//! - Subscribes to the honeypot sensor topic on Redpanda
//! - Normalizes each captured HTTP request into an event row
//! - Persists events to ClickHouse, acking only after persistence
//!
//! Enrichment runs separately as the `geo-sweep` and `llm-sweep` binaries.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use honey_store::{health as store_health, ClickHouseConfig, StoreClient};
use redpanda::{Consumer, RedpandaConfig};
use telemetry::{health, init_tracing_from_env, metrics};
use worker::{IngestWorker, IngestWorkerConfig};

/// Application configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    redpanda: RedpandaConfig,

    #[serde(default)]
    clickhouse: ClickHouseConfig,

    #[serde(default)]
    ingest: IngestWorkerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider BEFORE any TLS operations
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting honeypot consumer v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        brokers = ?config.redpanda.brokers,
        topic = %config.redpanda.topic,
        sasl_username = config.redpanda.sasl_username.as_deref().unwrap_or("none"),
        "Loaded Redpanda config"
    );

    // Initialize ClickHouse client and schema
    let store = Arc::new(
        StoreClient::new(config.clickhouse.clone())
            .context("Failed to create ClickHouse client")?,
    );

    store_health::init_schema(&store)
        .await
        .context("Failed to initialize ClickHouse schema")?;

    check_health(&config, &store).await;

    let consumer = Arc::new(Consumer::new(config.redpanda.clone()));

    let ingest = IngestWorker::with_config(consumer, store, config.ingest.clone());

    // Run until a shutdown signal arrives; the worker loop itself only
    // returns on unrecoverable errors.
    tokio::select! {
        result = ingest.run() => {
            if let Err(e) = result {
                error!("Ingestion worker stopped: {}", e);
            }
        }
        _ = shutdown_signal() => {}
    }

    info!("Shutting down...");

    let snapshot = metrics().snapshot();
    info!(
        events_ingested = snapshot.events_ingested,
        decode_failures = snapshot.decode_failures,
        store_errors = snapshot.store_errors,
        "Final ingestion counters"
    );

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("HONEY")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    config.redpanda.apply_env_overrides();
    config.clickhouse.apply_env_overrides();

    Ok(config)
}

/// Check component health on startup.
async fn check_health(config: &Config, store: &StoreClient) {
    let redpanda_healthy = redpanda::health::check_connection(&config.redpanda).await;
    if redpanda_healthy {
        health().redpanda.set_healthy();
        info!("Redpanda connection: healthy");
    } else {
        health().redpanda.set_unhealthy("Connection failed");
        error!("Redpanda connection: unhealthy");
    }

    let ch_healthy = store_health::check_connection(store).await;
    if ch_healthy {
        health().clickhouse.set_healthy();
        info!("ClickHouse connection: healthy");
    } else {
        health().clickhouse.set_unhealthy("Connection failed");
        error!("ClickHouse connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
