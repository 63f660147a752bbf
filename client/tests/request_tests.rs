//! Request-core behavior against a scripted transport: header injection,
//! error classification, retry, session side effects, degraded sync.

mod common;

use std::sync::Arc;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method};
use serde_json::{Value, json};
use tokio::time::sleep;

use client::{ApiClient, ApiError, MemoryNavigator, RequestOptions, event};
use common::{MockTransport, Scripted, sample_session, test_config};
use shared::types::session::{AUTH_TOKEN, SESSION_KEYS};

fn build_client(
    path: &str,
) -> (Arc<ApiClient>, Arc<MockTransport>, Arc<MemoryNavigator>) {
    let transport = MockTransport::new();
    let navigator = Arc::new(MemoryNavigator::new(path));
    let client = ApiClient::new(test_config(), transport.clone(), navigator.clone());
    (client, transport, navigator)
}

// ---------------------------------------------------------------------------
// Success path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_returns_parsed_json() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(200, json!({"id": 7, "status": "open"}));

    let value = client.get("/api/tickets/7/").await.unwrap();
    assert_eq!(value["id"], 7);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].uri, "http://backend.test/api/tickets/7/");
}

#[tokio::test]
async fn empty_success_body_parses_as_null() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(204, Value::Null);
    let value = client.delete("/api/tickets/7/").await.unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn get_with_params_builds_a_query_string() {
    let (client, transport, _) = build_client("/");
    client
        .get_with_params("/api/access/logs/", &[("limit", "10"), ("gate", "north east")])
        .await
        .unwrap();
    let uri = &transport.requests()[0].uri;
    assert_eq!(
        uri,
        "http://backend.test/api/access/logs/?limit=10&gate=north+east"
    );
}

// ---------------------------------------------------------------------------
// Header merging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_headers_carry_content_type_csrf_and_auth() {
    let (client, transport, _) = build_client("/");
    client.cookies().set(client::CSRF_COOKIE, "csrf-1");
    client.session().store(&sample_session());

    client.post("/api/tickets/", json!({"title": "leak"})).await.unwrap();

    let headers = &transport.requests()[0].headers;
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(headers.get("x-csrftoken").unwrap(), "csrf-1");
    assert_eq!(headers.get("authorization").unwrap(), "Token tok-abc");
    // Cookies ride along on every call.
    assert_eq!(headers.get("cookie").unwrap(), "csrftoken=csrf-1");
}

#[tokio::test]
async fn csrf_token_is_read_fresh_on_every_call() {
    let (client, transport, _) = build_client("/");
    client.cookies().set(client::CSRF_COOKIE, "first");
    client.post("/api/a/", json!({})).await.unwrap();
    client.cookies().set(client::CSRF_COOKIE, "second");
    client.post("/api/b/", json!({})).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].headers.get("x-csrftoken").unwrap(), "first");
    assert_eq!(requests[1].headers.get("x-csrftoken").unwrap(), "second");
}

#[tokio::test]
async fn caller_headers_win_over_defaults() {
    let (client, transport, _) = build_client("/");
    let opts = RequestOptions::new(Method::GET)
        .header(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    client.request("/api/export/", opts).await.unwrap();
    assert_eq!(
        transport.requests()[0].headers.get(CONTENT_TYPE).unwrap(),
        "text/csv"
    );
}

#[tokio::test]
async fn absorbed_cookies_ride_on_the_next_request() {
    let (client, transport, _) = build_client("/");
    let mut headers = http::HeaderMap::new();
    headers.append(
        http::header::SET_COOKIE,
        HeaderValue::from_static("sessionid=s-9; Path=/; HttpOnly"),
    );
    client.cookies().absorb(&headers);

    client.get("/api/a/").await.unwrap();
    assert_eq!(
        transport.requests()[0].headers.get("cookie").unwrap(),
        "sessionid=s-9"
    );
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_on_dashboard_clears_session_and_schedules_redirect() {
    let (client, transport, navigator) = build_client("/dashboard/resident");
    client.session().store(&sample_session());
    transport.respond_once(401, json!({"message": "expired"}));

    let err = client.get("/api/anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    // Cleared immediately, fully.
    for key in SESSION_KEYS {
        assert!(client.session().get(key).is_none(), "{} survived", key);
    }
    // Redirect only after the configured delay.
    assert!(navigator.history().is_empty());
    sleep(Duration::from_millis(80)).await;
    assert_eq!(navigator.history(), vec!["/login"]);
}

#[tokio::test]
async fn unauthorized_on_public_view_leaves_session_untouched() {
    let (client, transport, navigator) = build_client("/");
    client.session().store(&sample_session());
    transport.respond_once(401, Value::Null);

    let err = client.get("/api/probe").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    sleep(Duration::from_millis(80)).await;
    assert!(client.session().get(AUTH_TOKEN).is_some());
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn forbidden_emits_access_denied_and_fails() {
    let (client, transport, _) = build_client("/dashboard/admin");
    transport.respond_once(403, Value::Null);

    let received = Arc::new(std::sync::Mutex::new(Vec::<Value>::new()));
    let sink = received.clone();
    client.events().on(
        event::ACCESS_DENIED,
        Arc::new(move |data| sink.lock().unwrap().push(data.clone())),
    );

    let err = client.delete("/api/residents/1/").await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    let events = received.lock().unwrap();
    assert_eq!(events.len(), 1);
    let message = events[0]["message"].as_str().unwrap();
    assert!(!message.is_empty());
}

#[tokio::test]
async fn other_statuses_map_to_http_error() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(500, json!({"message": "boom"}));
    let err = client.get("/api/x").await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 500 }));
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn transport_failure_maps_to_network_error() {
    let (client, transport, _) = build_client("/");
    transport.fail_once("connection refused");
    let err = client.get("/api/x").await.unwrap_err();
    match err {
        ApiError::Network(msg) => assert!(msg.contains("connection refused")),
        other => panic!("expected Network, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Retry helper
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retry_succeeds_on_third_attempt() {
    let (client, transport, _) = build_client("/");
    transport.fail_once("down");
    transport.fail_once("still down");
    transport.respond_once(200, json!({"ok": true}));

    let value = client
        .retry_request("/api/flaky/", RequestOptions::new(Method::GET), 3)
        .await
        .unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn retry_gives_up_after_max_attempts() {
    let (client, transport, _) = build_client("/");
    transport.set_fallback(Scripted::Fail("down".into()));

    let err = client
        .retry_request("/api/flaky/", RequestOptions::new(Method::GET), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(transport.request_count(), 3);
}

// ---------------------------------------------------------------------------
// Login / logout / health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_success_stores_the_session() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(
        200,
        json!({
            "success": true,
            "user": {
                "token": "fresh-token",
                "role": "guard",
                "email": "gate@example.com"
            }
        }),
    );

    let response = client.login("gate@example.com", "pw").await.unwrap();
    assert!(response.success);
    assert!(client.session().is_authenticated());
    assert_eq!(client.session().token().as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn failed_login_stores_nothing() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(200, json!({"success": false, "message": "nope"}));
    let response = client.login("x@example.com", "bad").await.unwrap();
    assert!(!response.success);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn logout_clears_every_key_before_navigating() {
    let (client, _, navigator) = build_client("/dashboard/resident");
    client.session().store(&sample_session());

    client.logout();

    assert!(!client.session().is_authenticated());
    for key in SESSION_KEYS {
        assert!(client.session().get(key).is_none());
    }
    assert_eq!(navigator.history(), vec!["/login"]);
}

#[tokio::test]
async fn health_probe_maps_status_to_bool() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(200, Value::Null);
    assert!(client.check_health().await);
    transport.respond_once(503, Value::Null);
    assert!(!client.check_health().await);
}

// ---------------------------------------------------------------------------
// Degraded sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_returns_payload_when_healthy() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(200, json!({"tickets": [{"id": 1}, {"id": 2}]}));
    let result = client.sync_maintenance().await;
    assert_eq!(result.tickets.len(), 2);
    assert!(!result.is_degraded());
}

#[tokio::test]
async fn sync_degrades_instead_of_failing() {
    let (client, transport, _) = build_client("/");
    transport.set_fallback(Scripted::Fail("down".into()));

    let maintenance = client.sync_maintenance().await;
    assert!(maintenance.tickets.is_empty());
    assert_eq!(maintenance.error.as_deref(), Some("connection error"));

    let access = client.sync_access().await;
    assert!(access.is_degraded());
}

#[tokio::test]
async fn sync_degrades_on_malformed_payload() {
    let (client, transport, _) = build_client("/");
    transport.respond_once(200, json!({"tickets": "not an array"}));
    let result = client.sync_maintenance().await;
    assert!(result.is_degraded());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notify_posts_to_the_domain_endpoint() {
    let (client, transport, _) = build_client("/");
    client
        .notify_maintenance_change("created", json!({"ticket": 12}))
        .await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].uri,
        "http://backend.test/api/notify/maintenance/"
    );
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["action"], "created");
    assert_eq!(body["data"]["ticket"], 12);
}

#[tokio::test]
async fn notify_swallows_server_failures() {
    let (client, transport, _) = build_client("/");
    transport.set_fallback(Scripted::Fail("down".into()));
    // Must not panic or surface an error.
    client
        .notify_financial_change("paid", json!({"amount": 100}))
        .await;
    assert_eq!(transport.request_count(), 1);
}
