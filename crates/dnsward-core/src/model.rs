// ── Domain model ──
//
// Display-ready records derived from the API payloads. Every collection
// here is rebuilt from scratch on each refresh cycle.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// An allow-listed domain, exactly as the API returned it.
pub type AllowedDomain = String;

/// One filter-rule hit counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticEntry {
    pub label: String,
    pub count: u64,
}

/// One cached DNS record and its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub name: String,
    /// Seconds since the Unix epoch.
    pub valid_until: i64,
}

impl CacheEntry {
    /// Expiry as a UTC timestamp. `None` if out of chrono's range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.valid_until, 0)
    }

    /// Expiry in the operator's local time, e.g. `2024-06-15 12:30:00`.
    pub fn expiry_display(&self) -> String {
        self.expires_at().map_or_else(
            || self.valid_until.to_string(),
            |ts| {
                ts.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            },
        )
    }
}

/// Latency summary for one upstream resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolverStat {
    pub resolver: String,
    pub average_millis: f64,
    pub count: usize,
}

/// One complete refresh cycle's worth of data.
///
/// Only ever built from a cycle in which every stage succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Ascending by count.
    pub statistics: Vec<StatisticEntry>,
    /// Ascending by `valid_until`.
    pub cache: Vec<CacheEntry>,
    /// One row per attributed resolver, first-seen order.
    pub resolvers: Vec<ResolverStat>,
    /// API order.
    pub allowed_domains: Vec<AllowedDomain>,
    pub fetched_at: DateTime<Utc>,
}

impl Dashboard {
    /// Number of cached records, shown next to the cache table.
    pub fn cache_count(&self) -> usize {
        self.cache.len()
    }
}
