#![allow(clippy::unwrap_used)]
// Integration tests for `StatsAggregator` using wiremock.
//
// Timing-sensitive tests use generous delays (hundreds of milliseconds)
// so they stay deterministic on slow CI machines.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkseal_api::{SecureLinkClient, TransportConfig};
use linkseal_core::StatsAggregator;

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StatsAggregator) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = SecureLinkClient::new(base_url, &TransportConfig::default()).unwrap();
    (server, StatsAggregator::new(client, 5))
}

/// Mount healthy defaults for all seven stat endpoints.
async fn mount_all_healthy(server: &MockServer) {
    mount(server, "/api/stats/links", json!({ "active": 2, "expired": 1, "revoked": 0 })).await;
    mount(
        server,
        "/api/stats/access/summary",
        json!({ "total": 10, "success": 8, "failed": 1, "expired": 1, "uniqueOrigins": 4 }),
    )
    .await;
    mount(server, "/api/stats/access/hourly", json!([{ "hour": 9, "count": 4 }])).await;
    mount(
        server,
        "/api/stats/access/daily",
        json!([{ "accessDate": "2025-04-01", "count": 3 }]),
    )
    .await;
    mount(
        server,
        "/api/stats/access/failures",
        json!([{ "result": "EXPIRED", "count": 2 }]),
    )
    .await;
    mount(
        server,
        "/api/stats/links/top",
        json!([{ "shortCode": "abcd1234", "accessCount": 7 }]),
    )
    .await;
    mount(server, "/api/stats/security/exceptions", json!([])).await;
}

async fn mount(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_failing(server: &MockServer, endpoint: &str) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_populates_full_snapshot() {
    let (server, agg) = setup().await;
    mount_all_healthy(&server).await;

    agg.refresh(true).await;
    let snap = agg.snapshot();

    assert_eq!(snap.link_counts.as_ref().unwrap().active, 2);
    assert_eq!(snap.access_summary.as_ref().unwrap().total, 10);
    assert_eq!(snap.hourly.len(), 1);
    assert_eq!(snap.daily.len(), 1);
    assert_eq!(snap.failures.len(), 1);
    assert_eq!(snap.top_links.len(), 1);
    assert!(snap.security_exceptions.is_empty());

    assert!(!snap.partial_failure);
    assert!(!snap.is_loading);
    assert!(snap.updated_at.is_some());
    assert_eq!(snap.online, Some(true));
}

// ── Partial failure containment ─────────────────────────────────────

#[tokio::test]
async fn two_failed_queries_flag_partial_and_spare_the_rest() {
    let (server, agg) = setup().await;
    mount_failing(&server, "/api/stats/access/hourly").await;
    mount_failing(&server, "/api/stats/access/failures").await;
    mount(&server, "/api/stats/links", json!({ "active": 2, "expired": 1, "revoked": 0 })).await;
    mount(
        &server,
        "/api/stats/access/summary",
        json!({ "total": 10, "success": 8, "failed": 1, "expired": 1, "uniqueOrigins": 4 }),
    )
    .await;
    mount(
        &server,
        "/api/stats/access/daily",
        json!([{ "accessDate": "2025-04-01", "count": 3 }]),
    )
    .await;
    mount(
        &server,
        "/api/stats/links/top",
        json!([{ "shortCode": "abcd1234", "accessCount": 7 }]),
    )
    .await;
    mount(&server, "/api/stats/security/exceptions", json!([])).await;

    agg.refresh(true).await;
    let snap = agg.snapshot();

    assert!(snap.partial_failure);
    // Failed kinds stay at their defaults (no prior cycle ran).
    assert!(snap.hourly.is_empty());
    assert!(snap.failures.is_empty());
    // The five successful kinds are populated.
    assert!(snap.link_counts.is_some());
    assert!(snap.access_summary.is_some());
    assert_eq!(snap.daily.len(), 1);
    assert_eq!(snap.top_links.len(), 1);
    // The barrier still settled the cycle.
    assert!(snap.updated_at.is_some());
    assert!(!snap.is_loading);
}

#[tokio::test]
async fn failed_query_retains_value_from_prior_cycle() {
    let (server, agg) = setup().await;

    // Cycle 1: hourly healthy (single use), everything else always healthy.
    Mock::given(method("GET"))
        .and(path("/api/stats/access/hourly"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "hour": 9, "count": 4 }])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_failing(&server, "/api/stats/access/hourly").await;
    mount(&server, "/api/stats/links", json!({ "active": 2, "expired": 1, "revoked": 0 })).await;
    mount(
        &server,
        "/api/stats/access/summary",
        json!({ "total": 10, "success": 8, "failed": 1, "expired": 1, "uniqueOrigins": 4 }),
    )
    .await;
    mount(&server, "/api/stats/access/daily", json!([])).await;
    mount(&server, "/api/stats/access/failures", json!([])).await;
    mount(&server, "/api/stats/links/top", json!([])).await;
    mount(&server, "/api/stats/security/exceptions", json!([])).await;

    agg.refresh(true).await;
    let first = agg.snapshot();
    assert!(!first.partial_failure);
    assert_eq!(first.hourly.len(), 1);

    // Cycle 2: hourly now fails; its previous value must survive.
    agg.refresh(false).await;
    let second = agg.snapshot();
    assert!(second.partial_failure);
    assert_eq!(second.hourly.len(), 1);
    assert_eq!(second.hourly[0].hour, 9);
    assert!(second.updated_at.unwrap() >= first.updated_at.unwrap());
}

// ── Staleness guard across overlapping cycles ───────────────────────

#[tokio::test]
async fn late_completions_from_superseded_cycle_are_dropped() {
    let (server, agg) = setup().await;

    // Cycle A gets a slow hourly answer with stale data; cycle B gets a
    // fast one with fresh data.
    Mock::given(method("GET"))
        .and(path("/api/stats/access/hourly"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "hour": 1, "count": 111 }]))
                .set_delay(Duration::from_millis(600)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats/access/hourly"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "hour": 2, "count": 222 }])),
        )
        .mount(&server)
        .await;
    mount(&server, "/api/stats/links", json!({ "active": 2, "expired": 1, "revoked": 0 })).await;
    mount(
        &server,
        "/api/stats/access/summary",
        json!({ "total": 10, "success": 8, "failed": 1, "expired": 1, "uniqueOrigins": 4 }),
    )
    .await;
    mount(&server, "/api/stats/access/daily", json!([])).await;
    mount(&server, "/api/stats/access/failures", json!([])).await;
    mount(&server, "/api/stats/links/top", json!([])).await;
    mount(&server, "/api/stats/security/exceptions", json!([])).await;

    // Cycle A in flight...
    let slow = {
        let agg = agg.clone();
        tokio::spawn(async move { agg.refresh(true).await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    // ...interrupted by cycle B, which settles first.
    agg.refresh(false).await;
    let after_b = agg.snapshot();
    assert_eq!(after_b.hourly.len(), 1);
    assert_eq!(after_b.hourly[0].hour, 2);
    assert!(!after_b.is_loading);
    let settled_at = after_b.updated_at.unwrap();

    // Cycle A's slow completion lands now -- and must change nothing.
    slow.await.unwrap();
    let after_a = agg.snapshot();
    assert_eq!(after_a.hourly[0].hour, 2, "stale cycle overwrote the snapshot");
    assert_eq!(after_a.updated_at.unwrap(), settled_at);
    assert!(!after_a.is_loading);
    assert!(!after_a.partial_failure);
}

// ── Poller lifecycle ────────────────────────────────────────────────

#[tokio::test]
async fn dispose_stops_the_poller() {
    let (server, agg) = setup().await;
    mount_all_healthy(&server).await;

    agg.start(Duration::from_millis(100));

    // Wait for the initial refresh to settle.
    let mut rx = agg.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while rx.borrow_and_update().updated_at.is_none() {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("initial refresh never settled");

    agg.dispose();
    let frozen_at = agg.snapshot().updated_at;

    // Several poll intervals later nothing may have fired.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(agg.snapshot().updated_at, frozen_at);
}

#[tokio::test]
async fn refresh_after_dispose_is_inert() {
    let (server, agg) = setup().await;
    mount_all_healthy(&server).await;

    agg.dispose();
    agg.refresh(true).await;

    let snap = agg.snapshot();
    assert!(snap.updated_at.is_none());
    assert!(!snap.is_loading);
    assert!(snap.link_counts.is_none());
}
