#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dnsward_api::{ApiClient, Error, Session};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(session: Session) -> (MockServer, ApiClient, Arc<Session>) {
    let server = MockServer::start().await;
    let session = Arc::new(session);
    let client =
        ApiClient::with_client(&server.uri(), reqwest::Client::new(), Arc::clone(&session))
            .unwrap();
    (server, client, session)
}

fn stored(password: &str) -> Session {
    Session::restore(SecretString::from(password.to_owned()))
}

fn api_path(resource: &str) -> String {
    format!("/api/1/{resource}")
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_header_from_stored_credential() {
    let (server, client, _session) = setup(stored("hunter2")).await;

    Mock::given(method("GET"))
        .and(path(api_path("allowed-domains")))
        .and(header("authorization", "Bearer hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["example.com"])))
        .expect(1)
        .mount(&server)
        .await;

    let domains = client.allowed_domains().await.unwrap();
    assert_eq!(domains, ["example.com"]);
}

#[tokio::test]
async fn test_bearer_header_falls_back_to_input() {
    let (server, client, session) = setup(Session::new()).await;
    session.set_input(SecretString::from("typed".to_owned()));

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer typed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.allowed_domains().await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let (server, client, session) = setup(stored("expired")).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.cache().await;

    match result {
        Err(Error::Unauthorized { ref status_text }) => {
            assert_eq!(status_text, "Unauthorized");
        }
        other => panic!("expected Unauthorized error, got: {other:?}"),
    }
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_server_error_keeps_session() {
    let (server, client, session) = setup(stored("hunter2")).await;

    Mock::given(method("GET"))
        .and(path(api_path("instrumentation")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.instrumentation().await;

    match result {
        Err(Error::RequestFailed {
            status,
            ref status_text,
        }) => {
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
        }
        other => panic!("expected RequestFailed error, got: {other:?}"),
    }
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_nonstandard_status_reports_code() {
    let (server, client, _session) = setup(stored("hunter2")).await;

    Mock::given(method("GET"))
        .and(path(api_path("cache")))
        .respond_with(ResponseTemplate::new(599))
        .mount(&server)
        .await;

    match client.cache().await {
        Err(Error::RequestFailed {
            status,
            ref status_text,
        }) => {
            assert_eq!(status, 599);
            assert_eq!(status_text, "599");
        }
        other => panic!("expected RequestFailed error, got: {other:?}"),
    }
}

// ── Payloads ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_filter_statistics_unwraps_envelope() {
    let (server, client, _session) = setup(stored("pw")).await;

    Mock::given(method("GET"))
        .and(path(api_path("filter-statistics")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "data": { "ads.example": 12, "tracker.example": 3 } }
        })))
        .mount(&server)
        .await;

    let counts = client.filter_statistics().await.unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["ads.example"], 12);
    assert_eq!(counts.get_index(1).map(|(k, _)| k.as_str()), Some("tracker.example"));
}

#[tokio::test]
async fn test_filter_statistics_keep_wire_order() {
    let (server, client, _session) = setup(stored("pw")).await;

    Mock::given(method("GET"))
        .and(path(api_path("filter-statistics")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data":{"data":{"z.example":5,"a.example":5,"m.example":1}}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let counts = client.filter_statistics().await.unwrap();
    let labels: Vec<_> = counts.keys().map(String::as_str).collect();
    assert_eq!(labels, ["z.example", "a.example", "m.example"]);
}

#[tokio::test]
async fn test_instrumentation_samples() {
    let (server, client, _session) = setup(stored("pw")).await;

    Mock::given(method("GET"))
        .and(path(api_path("instrumentation")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "container": [
                {
                    "resolver": "9.9.9.9:53",
                    "request_sent": { "secs_since_epoch": 10, "nanos_since_epoch": 0 },
                    "request_received": { "secs_since_epoch": 10, "nanos_since_epoch": 500000000 }
                },
                { "resolver": null, "request_sent": null, "request_received": null }
            ] }
        })))
        .mount(&server)
        .await;

    let samples = client.instrumentation().await.unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].resolver.as_deref(), Some("9.9.9.9:53"));
    assert!(samples[1].resolver.is_none());
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client, session) = setup(stored("pw")).await;

    Mock::given(method("GET"))
        .and(path(api_path("cache")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.cache().await;

    match result {
        Err(Error::MalformedResponse { ref body, .. }) => {
            assert!(body.contains("oops"));
        }
        other => panic!("expected MalformedResponse error, got: {other:?}"),
    }
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_schema_mismatch_is_malformed() {
    let (server, client, _session) = setup(stored("pw")).await;

    Mock::given(method("GET"))
        .and(path(api_path("cache")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "data": [ { "message": {}, "valid_until": "soon" } ] }
        })))
        .mount(&server)
        .await;

    let result = client.cache().await;
    assert!(
        matches!(result, Err(Error::MalformedResponse { .. })),
        "expected MalformedResponse, got: {result:?}"
    );
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_allowed_domain_posts_name() {
    let (server, client, _session) = setup(stored("pw")).await;

    Mock::given(method("POST"))
        .and(path(api_path("allowed-domains")))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "name": "example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.add_allowed_domain("example.com").await.unwrap();
    assert_eq!(ack, json!({}));
}

#[tokio::test]
async fn test_delete_allowed_domain_sends_name() {
    let (server, client, _session) = setup(stored("pw")).await;

    Mock::given(method("DELETE"))
        .and(path(api_path("allowed-domains")))
        .and(body_json(json!({ "name": "example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_allowed_domain("example.com").await.unwrap();
}

#[tokio::test]
async fn test_mutation_unauthorized_clears_session() {
    let (server, client, session) = setup(stored("stale")).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.add_allowed_domain("example.com").await;
    assert!(matches!(result, Err(Error::Unauthorized { .. })));
    assert!(!session.is_authenticated());
}
