// =============================================================================
// INTEGRATION TESTS - CONTROL SURFACE
// =============================================================================

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::common::{incidents_reply, test_state, FakeTransport, Reply};
use incident_monitor::AppState;

fn server_with(state: AppState) -> (TestServer, Arc<AppState>) {
    let state = Arc::new(state);
    let server = TestServer::new(incident_monitor::create_app(state.clone()))
        .expect("Failed to create test server");
    (server, state)
}

fn start_body() -> Value {
    json!({
        "api_key_id": "15",
        "api_key": "test-api-key",
        "host": "api.example.test",
        "polling_interval": "60",
        "severity_filter": "2,3",
        "time_filter": "all"
    })
}

#[tokio::test]
async fn start_with_missing_fields_is_rejected() {
    let (server, state) = server_with(test_state(FakeTransport::repeating(Reply::json(200, &incidents_reply(1)))));

    let response = server
        .post("/api/start_monitoring")
        .json(&json!({ "polling_interval": "60" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing required fields: api_key_id, api_key, host");
    assert!(!state.engine.status().is_running());
}

#[tokio::test]
async fn start_with_non_numeric_interval_gets_json_rejection() {
    let (server, state) = server_with(test_state(FakeTransport::repeating(Reply::json(200, &incidents_reply(1)))));

    let mut body = start_body();
    body["polling_interval"] = json!("");

    let response = server.post("/api/start_monitoring").json(&body).await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid configuration:"), "{}", message);
    assert!(!state.engine.status().is_running());
}

#[tokio::test]
async fn start_status_stop_round() {
    let (server, state) = server_with(test_state(FakeTransport::repeating(Reply::json(200, &incidents_reply(1)))));

    let body: Value = server.post("/api/start_monitoring").json(&start_body()).await.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Monitoring started");

    let body: Value = server.post("/api/start_monitoring").json(&start_body()).await.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Monitoring already active");

    let status: Value = server.get("/api/monitoring_status").await.json();
    assert_eq!(status["active"], true);
    assert_eq!(status["config"]["host"], "api.example.test");
    assert_eq!(status["config"]["api_key"], "***");
    assert_eq!(status["config"]["polling_interval"], 60);
    assert_eq!(status["config"]["severity_filter"], "2,3");

    let body: Value = server.post("/api/stop_monitoring").await.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Monitoring stopped");

    let status: Value = server.get("/api/monitoring_status").await.json();
    assert_eq!(status["active"], false);
    assert_eq!(status["config"], json!({}));

    // Stopping twice is fine
    let body: Value = server.post("/api/stop_monitoring").await.json();
    assert_eq!(body["success"], true);

    state.engine.shutdown().await;
}

#[tokio::test]
async fn get_logs_returns_recent_window() {
    let (server, state) = server_with(test_state(FakeTransport::repeating(Reply::json(200, &incidents_reply(1)))));

    let body: Value = server.get("/api/get_logs").await.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["logs"], json!([]));

    for i in 0..60 {
        state.log_sink.append_text(&format!("entry {}", i)).await.unwrap();
    }

    let body: Value = server.get("/api/get_logs").await.json();
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 50);
    assert!(logs[0].as_str().unwrap().ends_with("entry 10"));
    assert!(logs[49].as_str().unwrap().ends_with("entry 59"));
}

#[tokio::test]
async fn test_connection_requires_credentials() {
    let transport = FakeTransport::repeating(Reply::json(200, &incidents_reply(1)));
    let (server, _state) = server_with(test_state(transport.clone()));

    let body: Value = server
        .post("/api/test_connection")
        .json(&json!({ "host": "api.example.test" }))
        .await
        .json();

    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Missing required API credentials (API Key ID, API Key, or Host)"
    );
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_connection_reports_success() {
    let transport = FakeTransport::repeating(Reply::json(200, &incidents_reply(1)));
    let (server, _state) = server_with(test_state(transport.clone()));

    let body: Value = server.post("/api/test_connection").json(&start_body()).await.json();

    assert_eq!(body["success"], true);
    assert_eq!(body["status_code"], 200);
    assert_eq!(
        body["message"],
        "Connection successful! Server responded with status 200"
    );
    assert!(body["response_preview"].as_str().unwrap().contains("incident_id"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_connection_reports_rejected_credentials() {
    let transport = FakeTransport::repeating(Reply::json(401, &json!({ "reply": { "err_code": 401 } })));
    let (server, _state) = server_with(test_state(transport));

    let body: Value = server.post("/api/test_connection").json(&start_body()).await.json();

    assert_eq!(body["success"], false);
    assert_eq!(body["status_code"], 401);
    assert_eq!(
        body["message"],
        "Server responded with status 401. Check your credentials."
    );
}

#[tokio::test]
async fn test_connection_reports_non_json_reply() {
    let transport = FakeTransport::repeating(Reply::Body(502, b"Bad Gateway".to_vec()));
    let (server, _state) = server_with(test_state(transport));

    let body: Value = server.post("/api/test_connection").json(&start_body()).await.json();

    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid response format from server (Status: 502)");
    assert!(body.get("response_preview").is_none());
}

#[tokio::test]
async fn test_connection_reports_transport_failure() {
    let transport = FakeTransport::repeating(Reply::Fail("dns lookup failed".to_string()));
    let (server, _state) = server_with(test_state(transport));

    let body: Value = server.post("/api/test_connection").json(&start_body()).await.json();

    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Connection failed: Network error: dns lookup failed");
}

#[tokio::test]
async fn health_reports_version() {
    let (server, _state) = server_with(test_state(FakeTransport::repeating(Reply::json(200, &incidents_reply(1)))));

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn event_stream_is_served_as_sse_and_ends_on_shutdown() {
    let (server, state) = server_with(test_state(FakeTransport::repeating(Reply::json(200, &incidents_reply(1)))));

    // A fired shutdown token closes the stream so the response completes
    state.shutdown.cancel();

    let response = server.get("/api/events").await;
    response.assert_status(StatusCode::OK);
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
}
