use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{stream, Stream, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;
use crate::modules::monitor::{
    model::{MonitorConfig, MonitorStatus},
    schema::{
        ActionResponse, LogsResponse, MonitoringStatusResponse, TestConnectionRequest,
        TestConnectionResponse,
    },
};
use crate::services::events::MonitorEvent;
use crate::services::{query, signing};

const TEST_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
const PREVIEW_CHARS: usize = 200;

pub async fn start_monitoring(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MonitorConfig>, JsonRejection>,
) -> Json<ActionResponse> {
    // Malformed bodies get the same reply shape as any other rejected start
    let Json(config) = match payload {
        Ok(config) => config,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Start request body rejected");
            return Json(ActionResponse::rejected(format!(
                "Invalid configuration: {}",
                rejection.body_text()
            )));
        }
    };

    match state.engine.start(config) {
        Ok(()) => Json(ActionResponse::ok("Monitoring started")),
        Err(e) => {
            tracing::warn!(error = %e, "Start request rejected");
            Json(ActionResponse::rejected(e.to_string()))
        }
    }
}

pub async fn stop_monitoring(State(state): State<Arc<AppState>>) -> Json<ActionResponse> {
    state.engine.stop();
    Json(ActionResponse::ok("Monitoring stopped"))
}

pub async fn monitoring_status(
    State(state): State<Arc<AppState>>,
) -> Json<MonitoringStatusResponse> {
    let response = match state.engine.status() {
        MonitorStatus::Running(config) => MonitoringStatusResponse {
            active: true,
            config: serde_json::to_value(config.redacted()).unwrap_or_else(|_| json!({})),
        },
        MonitorStatus::Idle => MonitoringStatusResponse {
            active: false,
            config: json!({}),
        },
    };

    Json(response)
}

pub async fn get_logs(State(state): State<Arc<AppState>>) -> Json<LogsResponse> {
    match state.log_sink.read_recent(state.log_tail_lines).await {
        Ok(lines) => Json(LogsResponse {
            success: true,
            logs: Some(lines),
            message: None,
        }),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read log file");
            Json(LogsResponse {
                success: false,
                logs: None,
                message: Some(e.to_string()),
            })
        }
    }
}

/// Probe the incident API with a one-item query
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestConnectionRequest>,
) -> Json<TestConnectionResponse> {
    if !req.missing_fields().is_empty() {
        return Json(TestConnectionResponse::failed(
            "Missing required API credentials (API Key ID, API Key, or Host)",
        ));
    }

    let endpoint = if req.endpoint.trim().is_empty() {
        state.engine.settings().default_endpoint.clone()
    } else {
        req.endpoint.clone()
    };

    let headers = signing::sign_now(&req.api_key_id, &req.api_key);
    let result = state
        .transport
        .execute(
            &req.host,
            &endpoint,
            &query::probe_payload(),
            &headers,
            TEST_CONNECTION_TIMEOUT,
        )
        .await;

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(host = %req.host, error = %e, "Connection test failed");
            return Json(TestConnectionResponse::failed(format!("Connection failed: {}", e)));
        }
    };

    let status = response.status;
    let parsed: Value = match serde_json::from_slice(&response.body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return Json(TestConnectionResponse {
                success: false,
                message: format!("Invalid response format from server (Status: {})", status),
                status_code: Some(status),
                response_preview: None,
            });
        }
    };

    let success = status == 200;
    let message = if success {
        format!("Connection successful! Server responded with status {}", status)
    } else {
        format!("Server responded with status {}. Check your credentials.", status)
    };

    Json(TestConnectionResponse {
        success,
        message,
        status_code: Some(status),
        response_preview: Some(preview(&parsed)),
    })
}

/// Live status and result events as Server-Sent Events
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let receiver = state.events.subscribe();

    let greeting = stream::once(async { MonitorEvent::info("Connected to monitoring service") });
    let live = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let events = greeting
        .chain(live)
        .take_until(state.shutdown.clone().cancelled_owned())
        .map(|event| to_sse_event(&event));

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &MonitorEvent) -> Result<Event, axum::Error> {
    let payload = event.payload().map_err(axum::Error::new)?;
    Event::default().event(event.topic()).json_data(payload)
}

fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > PREVIEW_CHARS {
        let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text
    }
}
