//! ClickHouse health checks and schema initialization.

use crate::client::StoreClient;
use crate::schema::all_tables;
use honey_core::{Error, Result};
use tracing::{debug, error};

/// Check ClickHouse connection health.
pub async fn check_connection(client: &StoreClient) -> bool {
    match client.inner().query("SELECT 1").fetch_one::<u8>().await {
        Ok(_) => {
            debug!("ClickHouse connection healthy");
            true
        }
        Err(e) => {
            error!("ClickHouse health check failed: {}", e);
            false
        }
    }
}

/// Initialize the database schema.
///
/// Creates the database and all tables if they don't exist. Safe to call on
/// every process start; the consumer and both sweeps run this before doing
/// any work.
pub async fn init_schema(client: &StoreClient) -> Result<()> {
    for ddl in all_tables() {
        client
            .inner()
            .query(ddl)
            .execute()
            .await
            .map_err(|e| Error::store(format!("schema init error: {e}")))?;
    }

    debug!("ClickHouse schema initialized");
    Ok(())
}
