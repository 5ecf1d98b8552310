// Wire schemas for the management API.
//
// One struct per endpoint response. The server nests most payloads one or
// two levels deep (`data.data`, `data.container`); the `into_*` helpers
// peel that off so callers never touch the envelope.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── filter-statistics ───────────────────────────────────────────────

/// `GET filter-statistics` → `{ data: { data: { label: count } } }`
///
/// Labels keep the order the server sent them in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterStatisticsResponse {
    pub data: FilterStatisticsData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterStatisticsData {
    pub data: IndexMap<String, u64>,
}

impl FilterStatisticsResponse {
    pub fn into_counts(self) -> IndexMap<String, u64> {
        self.data.data
    }
}

// ── cache ───────────────────────────────────────────────────────────

/// `GET cache` → `{ data: { data: [ { message: { name }, valid_until } ] } }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheResponse {
    pub data: CacheData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheData {
    pub data: Vec<CacheRecord>,
}

/// One cached DNS answer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheRecord {
    pub message: CachedMessage,
    /// Expiry, seconds since the Unix epoch.
    pub valid_until: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CachedMessage {
    pub name: String,
}

impl CacheResponse {
    pub fn into_records(self) -> Vec<CacheRecord> {
        self.data.data
    }
}

// ── instrumentation ─────────────────────────────────────────────────

/// `GET instrumentation` → `{ data: { container: [ sample ] } }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstrumentationResponse {
    pub data: InstrumentationData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstrumentationData {
    pub container: Vec<InstrumentationSample>,
}

/// One traced upstream request.
///
/// Un-attributed samples (failed or cache-served lookups) carry no
/// resolver and may carry no timestamps either.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstrumentationSample {
    #[serde(default)]
    pub resolver: Option<String>,
    #[serde(default)]
    pub request_sent: Option<WireTimestamp>,
    #[serde(default)]
    pub request_received: Option<WireTimestamp>,
}

/// `SystemTime` as serde serializes it: whole seconds plus nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WireTimestamp {
    pub secs_since_epoch: i64,
    pub nanos_since_epoch: i64,
}

impl InstrumentationResponse {
    pub fn into_samples(self) -> Vec<InstrumentationSample> {
        self.data.container
    }
}

// ── allowed-domains ─────────────────────────────────────────────────

/// Request body for `POST` / `DELETE allowed-domains`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainRequest {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{CacheResponse, FilterStatisticsResponse, InstrumentationResponse};

    #[test]
    fn statistics_keep_server_order() {
        // A `json!` map is key-sorted, so parse text to keep wire order.
        let raw = r#"{"data":{"data":{"z.example":4,"a.example":1,"m.example":9}}}"#;
        let resp: FilterStatisticsResponse = serde_json::from_str(raw).expect("parse");
        let labels: Vec<_> = resp.into_counts().into_keys().collect();
        assert_eq!(labels, ["z.example", "a.example", "m.example"]);
    }

    #[test]
    fn cache_ignores_unknown_fields() {
        let raw = json!({
            "data": { "data": [
                { "message": { "name": "example.com", "answers": [] }, "valid_until": 1_700_000_000, "hits": 3 }
            ] },
            "capacity": 1024
        });
        let resp: CacheResponse = serde_json::from_value(raw).expect("parse");
        let records = resp.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message.name, "example.com");
        assert_eq!(records[0].valid_until, 1_700_000_000);
    }

    #[test]
    fn unattributed_sample_may_omit_timestamps() {
        let raw = json!({ "data": { "container": [
            { "resolver": null },
            {
                "resolver": "1.1.1.1:53",
                "request_sent": { "secs_since_epoch": 10, "nanos_since_epoch": 0 },
                "request_received": { "secs_since_epoch": 10, "nanos_since_epoch": 500 }
            }
        ] } });
        let resp: InstrumentationResponse = serde_json::from_value(raw).expect("parse");
        let samples = resp.into_samples();
        assert!(samples[0].resolver.is_none());
        assert!(samples[0].request_sent.is_none());
        assert_eq!(samples[1].resolver.as_deref(), Some("1.1.1.1:53"));
    }

    #[test]
    fn missing_envelope_is_rejected() {
        let raw = json!({ "container": [] });
        assert!(serde_json::from_value::<InstrumentationResponse>(raw).is_err());
    }
}
