//! Test fixtures: sensor payloads, stub response bodies, canned replies.

use honey_core::{HoneyEvent, IngestPayload};
use std::collections::BTreeMap;

use chrono::Utc;
use redpanda::Delivery;

/// Raw sensor payload JSON for one captured request.
pub fn sensor_payload(method: &str, path: &str, remote_address: &str) -> String {
    serde_json::json!({
        "time": Utc::now().to_rfc3339(),
        "host": "honeypot.example.net",
        "method": method,
        "path": path,
        "remote_address": remote_address,
        "user_agent": "curl/8.0",
        "query_params": {"q": "1"},
        "headers": {"Host": "honeypot.example.net"},
        "body": null
    })
    .to_string()
}

/// A raw delivery as fetched from the topic.
pub fn delivery(payload: &str, hostname: Option<&str>) -> Delivery {
    let mut attributes = BTreeMap::new();
    if let Some(hostname) = hostname {
        attributes.insert("hostname".to_string(), hostname.to_string());
    }
    Delivery {
        payload: payload.as_bytes().to_vec(),
        attributes,
        offset: 0,
    }
}

/// A normalized event, as the consumer would persist it.
pub fn captured_event(method: &str, path: &str, remote_address: &str) -> HoneyEvent {
    let payload: IngestPayload =
        serde_json::from_str(&sensor_payload(method, path, remote_address))
            .expect("fixture payload must decode");
    HoneyEvent::from_payload(payload, Some("sensor-test".to_string()), Utc::now())
}

/// A normalized event with no origin address (excluded from geo sweeps).
pub fn addressless_event() -> HoneyEvent {
    let payload: IngestPayload =
        serde_json::from_str(r#"{"method": "GET", "path": "/robots.txt"}"#)
            .expect("fixture payload must decode");
    HoneyEvent::from_payload(payload, Some("sensor-test".to_string()), Utc::now())
}

/// ipinfo stub response body for one address.
pub fn ipinfo_body(ip: &str) -> serde_json::Value {
    serde_json::json!({
        "ip": ip,
        "asn": "AS13335",
        "as_name": "Cloudflare, Inc.",
        "as_domain": "cloudflare.com",
        "country_code": "US",
        "country": "United States",
        "continent_code": "NA",
        "continent": "North America"
    })
}

/// A well-formed classification reply.
pub fn verdict_reply(malicious: &str) -> String {
    serde_json::json!({
        "malicious": malicious,
        "type_of_exploit": "SQL Injection",
        "target_software": "WordPress"
    })
    .to_string()
}

/// A reply with the string "null" where the model meant absent.
pub fn null_string_reply() -> String {
    r#"{"malicious":"low","type_of_exploit":"null","target_software":"null"}"#.to_string()
}

/// A reply whose detail field is only whitespace (invalid).
pub fn whitespace_reply() -> String {
    r#"{"malicious":"low","type_of_exploit":"   ","target_software":null}"#.to_string()
}
