// ── Aggregation ──
//
// Pure transforms from wire payloads to display rows. No I/O, no state:
// the controller feeds each stage's payload through here and keeps the
// result only if the whole cycle succeeds.

use indexmap::IndexMap;

use dnsward_api::models::{CacheRecord, InstrumentationSample, WireTimestamp};

use crate::error::CoreError;
use crate::model::{CacheEntry, ResolverStat, StatisticEntry};

pub const NANOS_PER_SEC: i128 = 1_000_000_000;
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Filter counters, ascending by count. Ties keep server order.
pub fn sort_statistics(counts: IndexMap<String, u64>) -> Vec<StatisticEntry> {
    let mut entries: Vec<StatisticEntry> = counts
        .into_iter()
        .map(|(label, count)| StatisticEntry { label, count })
        .collect();
    entries.sort_by_key(|e| e.count);
    entries
}

/// Cache records, ascending by expiry. Ties keep server order.
pub fn sort_cache(records: Vec<CacheRecord>) -> Vec<CacheEntry> {
    let mut entries: Vec<CacheEntry> = records
        .into_iter()
        .map(|r| CacheEntry {
            name: r.message.name,
            valid_until: r.valid_until,
        })
        .collect();
    entries.sort_by_key(|e| e.valid_until);
    entries
}

/// Nanoseconds between `sent` and `received`.
///
/// Negative if the clock stepped backwards between the two readings.
pub fn elapsed_nanos(sent: WireTimestamp, received: WireTimestamp) -> i128 {
    let secs = i128::from(received.secs_since_epoch) - i128::from(sent.secs_since_epoch);
    let nanos = i128::from(received.nanos_since_epoch) - i128::from(sent.nanos_since_epoch);
    secs * NANOS_PER_SEC + nanos
}

/// Per-resolver average latency (ms) and sample count.
///
/// Samples without a resolver are skipped. Rows come out in the order
/// each resolver was first seen.
pub fn aggregate_instrumentation(
    samples: &[InstrumentationSample],
) -> Result<Vec<ResolverStat>, CoreError> {
    let mut groups: IndexMap<&str, Vec<i128>> = IndexMap::new();

    for sample in samples {
        let Some(resolver) = sample.resolver.as_deref() else {
            continue;
        };
        let (Some(sent), Some(received)) = (sample.request_sent, sample.request_received) else {
            return Err(CoreError::MalformedResponse {
                message: format!("sample for resolver {resolver} is missing a timestamp"),
            });
        };
        groups
            .entry(resolver)
            .or_default()
            .push(elapsed_nanos(sent, received));
    }

    Ok(groups
        .into_iter()
        .map(|(resolver, elapsed)| {
            let count = elapsed.len();
            let sum: i128 = elapsed.iter().sum();
            #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
            let average_millis = sum as f64 / count as f64 / NANOS_PER_MILLI;
            ResolverStat {
                resolver: resolver.to_owned(),
                average_millis,
                count,
            }
        })
        .collect())
}

/// On-screen order, top row first.
///
/// Rows are laid out by inserting each computed row at the top of the
/// table, so the screen shows the computed order reversed.
pub fn top_down<T>(rows: &[T]) -> impl Iterator<Item = &T> {
    rows.iter().rev()
}
