//! Usage reporting against the in-memory backend: log entries appended by
//! the logging collaborator come back as time-bucketed statistics.

use chrono::{Duration, Utc};

use protean_core::{
    resources::Resources,
    usage::{EndpointType, LogEntry},
};
use protean_memory::{InMemoryDefinitions, InMemoryStore};

const HOUR: i64 = 3600;

fn entry(age: Duration, response_time_ms: i64, status_code: u16) -> LogEntry {
    let created = Utc::now() - age;
    let aligned_created = created.timestamp() / HOUR * HOUR;

    LogEntry {
        created,
        aligned_created,
        response_time_ms,
        status_code,
        endpoint_type: EndpointType::Resource,
    }
}

#[tokio::test]
async fn recent_resource_traffic_is_bucketed_and_averaged() {
    let store = InMemoryStore::new();
    for entry in [
        entry(Duration::minutes(5), 100, 200),
        entry(Duration::minutes(5), 300, 200),
        entry(Duration::minutes(5), 50, 404),
    ] {
        store.append_log("acme", entry).await;
    }

    let resources = Resources::new(store, InMemoryDefinitions::new());
    let report = resources.usage("acme", Duration::hours(1)).await.unwrap();

    // All three entries share one five-minute-old bucket, except when the
    // hour boundary fell inside the last five minutes; either way the totals
    // across buckets are fixed.
    let request_count: i64 = report.items.values().map(|b| b.request_count).sum();
    let total: i64 = report.items.values().map(|b| b.total_response_time).sum();
    assert_eq!(request_count, 3);
    assert_eq!(total, 450);

    if report.items.len() == 1 {
        let bucket = report.items.values().next().unwrap();
        assert_eq!(bucket.avg_response, 150);
        assert_eq!(bucket.status_codes[&200], 2);
        assert_eq!(bucket.status_codes[&404], 1);
    }
}

#[tokio::test]
async fn entries_outside_the_window_are_excluded() {
    let store = InMemoryStore::new();
    store.append_log("acme", entry(Duration::minutes(5), 100, 200)).await;
    store.append_log("acme", entry(Duration::hours(3), 999, 200)).await;

    let resources = Resources::new(store, InMemoryDefinitions::new());
    let report = resources.usage("acme", Duration::hours(1)).await.unwrap();

    let total: i64 = report.items.values().map(|b| b.total_response_time).sum();
    assert_eq!(total, 100);
}

#[tokio::test]
async fn non_resource_endpoints_are_excluded() {
    let store = InMemoryStore::new();
    store.append_log("acme", entry(Duration::minutes(5), 100, 200)).await;

    let mut definition_hit = entry(Duration::minutes(5), 900, 200);
    definition_hit.endpoint_type = EndpointType::Definition;
    store.append_log("acme", definition_hit).await;

    let resources = Resources::new(store, InMemoryDefinitions::new());
    let report = resources.usage("acme", Duration::hours(1)).await.unwrap();

    let total: i64 = report.items.values().map(|b| b.total_response_time).sum();
    assert_eq!(total, 100);
}

#[tokio::test]
async fn usage_is_per_tenant() {
    let store = InMemoryStore::new();
    store.append_log("acme", entry(Duration::minutes(5), 100, 200)).await;

    let resources = Resources::new(store, InMemoryDefinitions::new());
    let report = resources.usage("globex", Duration::hours(1)).await.unwrap();

    assert!(report.items.is_empty());
}

#[tokio::test]
async fn a_tenant_with_no_traffic_gets_an_empty_report() {
    let resources = Resources::new(InMemoryStore::new(), InMemoryDefinitions::new());

    let report = resources.usage("acme", Duration::hours(1)).await.unwrap();

    assert!(report.items.is_empty());
}

#[tokio::test]
async fn report_buckets_are_sorted_ascending() {
    let store = InMemoryStore::new();
    for age in [50, 40, 30, 20, 10] {
        store.append_log("acme", entry(Duration::minutes(age), 100, 200)).await;
    }

    let resources = Resources::new(store, InMemoryDefinitions::new());
    let report = resources.usage("acme", Duration::hours(1)).await.unwrap();

    let keys: Vec<i64> = report.items.keys().copied().collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
}
