//! Time-bucketed usage statistics computed from request logs.
//!
//! Log entries are appended by an external logging collaborator and are
//! read-only here. [`UsageAggregator`] folds a stream of entries into
//! per-bucket counters in a single pass, using memory proportional to the
//! number of distinct buckets. Buckets are ephemeral: computed per request,
//! never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::{filter::FieldTypes, schema::PropertyType};

/// The class of endpoint a logged request hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    /// A tenant resource data endpoint (create/list/get/delete).
    Resource,
    /// A resource definition management endpoint.
    Definition,
}

impl EndpointType {
    /// The wire form, as stored in log entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointType::Resource => "resource",
            EndpointType::Definition => "definition",
        }
    }
}

/// One logged request, produced by the external logging collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the request was handled. Stored as unix seconds so time-window
    /// filters compare numerically.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    /// The pre-quantized bucket key for this entry's time window.
    pub aligned_created: i64,
    /// Wall-clock handling time in milliseconds.
    pub response_time_ms: i64,
    /// The response status code.
    pub status_code: u16,
    /// Which class of endpoint was hit.
    pub endpoint_type: EndpointType,
}

/// The fixed field-type table log filters are validated against.
///
/// Log entries have a known shape, so their filters need no resolved
/// definition; this stands in for one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFields;

impl FieldTypes for LogFields {
    fn field_type(&self, field: &str) -> Option<PropertyType> {
        match field {
            "created" | "aligned_created" | "response_time_ms" | "status_code" => {
                Some(PropertyType::Number)
            }
            "endpoint_type" => Some(PropertyType::String),
            _ => None,
        }
    }
}

/// Aggregated request statistics for one time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageBucket {
    /// Number of requests in the window.
    pub request_count: i64,
    /// Sum of response times, kept for the average and not serialized.
    #[serde(skip_serializing)]
    pub total_response_time: i64,
    /// Truncating mean response time; valid only when `request_count > 0`.
    pub avg_response: i64,
    /// Count of responses per status code.
    pub status_codes: BTreeMap<u16, i64>,
}

/// Folds log entries into per-window buckets.
///
/// Feeding successive pages of the same log stream merges idempotently: an
/// existing bucket accumulates, it is never overwritten. The internal map
/// carries no ordering guarantee; [`finish`](UsageAggregator::finish) sorts.
#[derive(Debug, Default)]
pub struct UsageAggregator {
    buckets: HashMap<i64, UsageBucket>,
}

impl UsageAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one entry into its bucket.
    pub fn record(&mut self, entry: &LogEntry) {
        let bucket = self
            .buckets
            .entry(entry.aligned_created)
            .or_default();

        bucket.request_count += 1;
        bucket.total_response_time += entry.response_time_ms;
        *bucket
            .status_codes
            .entry(entry.status_code)
            .or_default() += 1;
    }

    /// Folds a page of entries.
    pub fn extend<'a>(&mut self, entries: impl IntoIterator<Item = &'a LogEntry>) {
        for entry in entries {
            self.record(entry);
        }
    }

    /// True when no entry has been recorded.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Computes each bucket's average and returns the buckets keyed
    /// ascending.
    ///
    /// The ascending order is the explicit determinism choice for
    /// serialization; empty input yields an empty map and no division is
    /// performed.
    pub fn finish(self) -> BTreeMap<i64, UsageBucket> {
        self.buckets
            .into_iter()
            .map(|(key, mut bucket)| {
                if bucket.request_count > 0 {
                    bucket.avg_response = bucket.total_response_time / bucket.request_count;
                }

                (key, bucket)
            })
            .collect()
    }
}

/// The usage response envelope: bucket key to statistics, keys ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    /// Per-window statistics.
    pub items: BTreeMap<i64, UsageBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(aligned: i64, response_time_ms: i64, status_code: u16) -> LogEntry {
        LogEntry {
            created: Utc.timestamp_opt(aligned, 0).unwrap(),
            aligned_created: aligned,
            response_time_ms,
            status_code,
            endpoint_type: EndpointType::Resource,
        }
    }

    #[test]
    fn buckets_accumulate_count_total_average_and_statuses() {
        let entries = [
            entry(3600, 100, 200),
            entry(3600, 300, 200),
            entry(3600, 50, 404),
        ];

        let mut aggregator = UsageAggregator::new();
        aggregator.extend(&entries);
        let buckets = aggregator.finish();

        let bucket = &buckets[&3600];
        assert_eq!(bucket.request_count, 3);
        assert_eq!(bucket.total_response_time, 450);
        assert_eq!(bucket.avg_response, 150);
        assert_eq!(bucket.status_codes[&200], 2);
        assert_eq!(bucket.status_codes[&404], 1);
    }

    #[test]
    fn empty_input_yields_an_empty_map() {
        let aggregator = UsageAggregator::new();

        assert!(aggregator.is_empty());
        assert!(aggregator.finish().is_empty());
    }

    #[test]
    fn feeding_pages_merges_the_same_as_one_pass() {
        let entries: Vec<LogEntry> = (0..10)
            .map(|i| entry(3600 * (i % 3), 10 * i, 200))
            .collect();

        let mut single = UsageAggregator::new();
        single.extend(&entries);

        let mut paged = UsageAggregator::new();
        paged.extend(&entries[..4]);
        paged.extend(&entries[4..]);

        assert_eq!(single.finish(), paged.finish());
    }

    #[test]
    fn finished_buckets_iterate_ascending_by_key() {
        let mut aggregator = UsageAggregator::new();
        for aligned in [7200, 0, 3600, 10800] {
            aggregator.record(&entry(aligned, 100, 200));
        }

        let keys: Vec<i64> = aggregator.finish().into_keys().collect();

        assert_eq!(keys, vec![0, 3600, 7200, 10800]);
    }

    #[test]
    fn entries_in_different_windows_never_mix() {
        let mut aggregator = UsageAggregator::new();
        aggregator.record(&entry(0, 100, 200));
        aggregator.record(&entry(3600, 300, 500));

        let buckets = aggregator.finish();

        assert_eq!(buckets[&0].request_count, 1);
        assert_eq!(buckets[&0].avg_response, 100);
        assert_eq!(buckets[&3600].request_count, 1);
        assert_eq!(buckets[&3600].avg_response, 300);
    }

    #[test]
    fn log_entries_round_trip_with_unix_second_timestamps() {
        let entry = entry(3600, 42, 200);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["created"], serde_json::json!(3600));
        assert_eq!(json["endpoint_type"], serde_json::json!("resource"));

        let restored: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(restored, entry);
    }
}
