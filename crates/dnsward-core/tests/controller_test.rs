#![allow(clippy::unwrap_used)]
// Refresh-cycle tests for `Controller` against a wiremock filter API.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dnsward_api::{ApiClient, Session};
use dnsward_core::{Controller, CoreError, ViewState, aggregate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(session: Session) -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let client =
        ApiClient::with_client(&server.uri(), reqwest::Client::new(), Arc::new(session)).unwrap();
    (server, Controller::with_client(client))
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

fn api_path(resource: &str) -> String {
    format!("/api/1/{resource}")
}

fn statistics_body() -> Value {
    json!({ "data": { "data": { "a": 3, "b": 1, "c": 2 } } })
}

fn cache_body() -> Value {
    json!({ "data": { "data": [
        { "message": { "name": "late.example" }, "valid_until": 1_700_000_300 },
        { "message": { "name": "early.example" }, "valid_until": 1_700_000_100 }
    ] } })
}

fn instrumentation_body() -> Value {
    let sample = |resolver: Value, nanos: u64| {
        json!({
            "resolver": resolver,
            "request_sent": { "secs_since_epoch": 10, "nanos_since_epoch": 0 },
            "request_received": { "secs_since_epoch": 10, "nanos_since_epoch": nanos }
        })
    };
    json!({ "data": { "container": [
        sample(json!("dns1"), 1_000_000),
        sample(json!("dns2"), 2_000_000),
        sample(Value::Null, 7_000_000),
        sample(json!("dns1"), 3_000_000)
    ] } })
}

async fn mount_get(server: &MockServer, resource: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(api_path(resource)))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_healthy(server: &MockServer, domains: Value) {
    mount_get(server, "filter-statistics", 200, statistics_body()).await;
    mount_get(server, "cache", 200, cache_body()).await;
    mount_get(server, "instrumentation", 200, instrumentation_body()).await;
    mount_get(server, "allowed-domains", 200, domains).await;
}

// ── Full cycle ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_runs_full_cycle() {
    let (server, controller) = setup(Session::new()).await;
    mount_healthy(&server, json!(["ads.example", "example.com"])).await;

    let dashboard = controller.login(secret("hunter2")).await.unwrap();

    let stats: Vec<_> = dashboard.statistics.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(stats, ["b", "c", "a"]);
    let screen: Vec<_> = aggregate::top_down(&dashboard.statistics)
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(screen, ["a", "c", "b"]);

    let cache: Vec<_> = dashboard.cache.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(cache, ["early.example", "late.example"]);
    assert_eq!(dashboard.cache_count(), 2);

    assert_eq!(dashboard.resolvers.len(), 2);
    assert_eq!(dashboard.resolvers[0].resolver, "dns1");
    assert_eq!(dashboard.resolvers[0].count, 2);
    assert!((dashboard.resolvers[0].average_millis - 2.0).abs() < f64::EPSILON);
    assert_eq!(dashboard.resolvers[1].resolver, "dns2");
    assert_eq!(dashboard.resolvers[1].count, 1);

    assert_eq!(dashboard.allowed_domains, ["ads.example", "example.com"]);

    assert_eq!(controller.view_state(), ViewState::Ready);
    assert!(controller.session().is_authenticated());
    assert!(controller.dashboard().is_some());
}

#[tokio::test]
async fn test_statistics_ties_keep_wire_order() {
    let (server, controller) = setup(Session::new()).await;
    Mock::given(method("GET"))
        .and(path(api_path("filter-statistics")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data":{"data":{"z":5,"y":5,"x":1}}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    mount_get(&server, "cache", 200, cache_body()).await;
    mount_get(&server, "instrumentation", 200, instrumentation_body()).await;
    mount_get(&server, "allowed-domains", 200, json!([])).await;

    let dashboard = controller.login(secret("hunter2")).await.unwrap();
    let labels: Vec<_> = dashboard.statistics.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["x", "z", "y"]);
}

#[tokio::test]
async fn test_every_request_carries_bearer() {
    let (server, controller) = setup(Session::restore(secret("stored-pw"))).await;

    Mock::given(header("authorization", "Bearer stored-pw"))
        .and(method("GET"))
        .and(path(api_path("filter-statistics")))
        .respond_with(ResponseTemplate::new(200).set_body_json(statistics_body()))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(&server, "cache", 200, cache_body()).await;
    mount_get(&server, "instrumentation", 200, instrumentation_body()).await;
    mount_get(&server, "allowed-domains", 200, json!([])).await;

    controller.refresh().await.unwrap();
}

// ── Failure handling ────────────────────────────────────────────────

#[tokio::test]
async fn test_rejected_login_is_not_stored() {
    let (server, controller) = setup(Session::new()).await;
    mount_get(&server, "filter-statistics", 401, json!({})).await;

    let result = controller.login(secret("wrong")).await;

    assert!(matches!(result, Err(CoreError::Unauthorized { .. })));
    assert!(!controller.session().is_authenticated());
    assert!(matches!(
        controller.view_state(),
        ViewState::Unauthenticated { error: Some(_) }
    ));
    assert!(controller.dashboard().is_none());
}

#[tokio::test]
async fn test_unauthorized_mid_cycle_keeps_previous_dashboard() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;
    mount_healthy(&server, json!(["example.com"])).await;
    let first = controller.refresh().await.unwrap();

    server.reset().await;
    mount_get(&server, "filter-statistics", 200, json!({ "data": { "data": { "new": 99 } } }))
        .await;
    mount_get(&server, "cache", 401, json!({})).await;

    let result = controller.refresh().await;

    assert!(matches!(result, Err(CoreError::Unauthorized { .. })));
    assert!(!controller.session().is_authenticated());
    let state = controller.view_state();
    assert!(!state.is_main_visible());
    assert!(matches!(state, ViewState::Unauthenticated { error: Some(_) }));

    // Nothing from the failed cycle leaks into the published dashboard.
    let retained = controller.dashboard().unwrap();
    assert!(Arc::ptr_eq(&first, &retained));
    assert!(retained.statistics.iter().all(|e| e.label != "new"));
}

#[tokio::test]
async fn test_server_error_surfaces_status_text() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;
    mount_get(&server, "filter-statistics", 200, statistics_body()).await;
    mount_get(&server, "cache", 200, cache_body()).await;
    mount_get(&server, "instrumentation", 500, json!({})).await;

    let result = controller.refresh().await;

    match result {
        Err(CoreError::RequestFailed {
            status,
            ref status_text,
        }) => {
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
        }
        other => panic!("expected RequestFailed, got: {other:?}"),
    }
    assert!(controller.session().is_authenticated());
    match controller.view_state() {
        ViewState::Unauthenticated { error: Some(msg) } => {
            assert!(msg.contains("Internal Server Error"), "got: {msg}");
        }
        other => panic!("expected Unauthenticated, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_schema_mismatch_stops_cycle() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;
    mount_get(&server, "filter-statistics", 200, statistics_body()).await;
    mount_get(&server, "cache", 200, cache_body()).await;
    mount_get(&server, "instrumentation", 200, json!({ "data": { "samples": [] } })).await;

    Mock::given(method("GET"))
        .and(path(api_path("allowed-domains")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = controller.refresh().await;
    assert!(matches!(result, Err(CoreError::MalformedResponse { .. })));
}

// ── Allow-list mutations ────────────────────────────────────────────

#[tokio::test]
async fn test_add_allowed_domain_then_refresh() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;

    Mock::given(method("POST"))
        .and(path(api_path("allowed-domains")))
        .and(body_json(json!({ "name": "example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_healthy(&server, json!(["ads.example", "example.com"])).await;

    let dashboard = controller.add_allowed_domain("example.com").await.unwrap();

    assert!(dashboard.allowed_domains.iter().any(|d| d == "example.com"));
    assert_eq!(controller.view_state(), ViewState::Ready);
}

#[tokio::test]
async fn test_delete_allowed_domain_then_refresh() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;

    Mock::given(method("DELETE"))
        .and(path(api_path("allowed-domains")))
        .and(body_json(json!({ "name": "example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_healthy(&server, json!(["ads.example"])).await;

    let dashboard = controller.delete_allowed_domain("example.com").await.unwrap();
    assert_eq!(dashboard.allowed_domains, ["ads.example"]);
}

#[tokio::test]
async fn test_failed_add_leaves_view_untouched() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;
    mount_healthy(&server, json!([])).await;
    controller.refresh().await.unwrap();

    Mock::given(method("POST"))
        .and(path(api_path("allowed-domains")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = controller.add_allowed_domain("example.com").await;

    assert!(matches!(
        result,
        Err(CoreError::RequestFailed { status: 503, .. })
    ));
    assert_eq!(controller.view_state(), ViewState::Ready);
}

#[tokio::test]
async fn test_blank_domain_is_rejected_locally() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let result = controller.add_allowed_domain("   ").await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
}

// ── Re-entrancy ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_newer_cycle_supersedes_in_flight_one() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;

    Mock::given(method("GET"))
        .and(path(api_path("filter-statistics")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(statistics_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_get(&server, "cache", 200, cache_body()).await;
    mount_get(&server, "instrumentation", 200, instrumentation_body()).await;
    mount_get(&server, "allowed-domains", 200, json!(["example.com"])).await;

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = controller.refresh().await;
    let first = first.await.unwrap();

    assert!(matches!(first, Err(CoreError::Superseded)));
    let dashboard = second.unwrap();
    assert_eq!(dashboard.allowed_domains, ["example.com"]);
    assert_eq!(controller.view_state(), ViewState::Ready);
}

// ── Single-category reads ───────────────────────────────────────────

#[tokio::test]
async fn test_single_reads_leave_view_state_alone() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;
    mount_healthy(&server, json!(["example.com"])).await;

    let resolvers = controller.resolver_stats().await.unwrap();
    assert_eq!(resolvers.len(), 2);
    let cache = controller.cache_entries().await.unwrap();
    assert_eq!(cache[0].name, "early.example");

    assert_eq!(
        controller.view_state(),
        ViewState::Unauthenticated { error: None }
    );
    assert!(controller.dashboard().is_none());
}

#[tokio::test]
async fn test_logout_resets_session() {
    let (server, controller) = setup(Session::restore(secret("pw"))).await;
    mount_healthy(&server, json!([])).await;
    controller.refresh().await.unwrap();

    controller.logout();

    assert!(!controller.session().is_authenticated());
    assert!(controller.session().credential().is_none());
    assert_eq!(
        controller.view_state(),
        ViewState::Unauthenticated { error: None }
    );
}

// ── Construction & observation ──────────────────────────────────────

#[tokio::test]
async fn test_oneshot_restores_stored_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("allowed-domains")))
        .and(header("authorization", "Bearer restored"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["example.com"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = dnsward_core::ClientConfig::new(server.uri().parse().unwrap());
    config.stored_credential = Some(secret("restored"));

    let domains = Controller::oneshot(&config, |controller| async move {
        assert!(controller.session().is_authenticated());
        controller.allowed_domains().await
    })
    .await
    .unwrap();
    assert_eq!(domains, ["example.com"]);
}

#[tokio::test]
async fn test_subscribers_see_published_dashboard() {
    let (server, controller) = setup(Session::new()).await;
    mount_healthy(&server, json!(["example.com"])).await;

    let mut dashboards = controller.subscribe_dashboard();
    let mut view = controller.subscribe_view();
    assert!(dashboards.borrow_and_update().is_none());

    let published = controller.login(secret("hunter2")).await.unwrap();

    assert!(dashboards.has_changed().unwrap());
    let seen = dashboards.borrow_and_update().clone().unwrap();
    assert!(Arc::ptr_eq(&seen, &published));
    assert_eq!(*view.borrow_and_update(), ViewState::Ready);
    assert!(view.borrow().is_main_visible());
}
