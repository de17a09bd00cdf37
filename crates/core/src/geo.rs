//! Geolocation annotations for origin addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One geolocation result for a distinct origin address.
///
/// At most one row exists per address, regardless of how many events share
/// it. Absence of a row is the sole "not yet enriched" signal, so the row is
/// written whole or not at all and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpInfo {
    pub ip_address: String,
    pub asn: Option<String>,
    pub as_name: Option<String>,
    pub as_domain: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub continent_code: Option<String>,
    pub continent: Option<String>,
    pub created: DateTime<Utc>,
}
