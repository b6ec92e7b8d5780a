pub mod config;
pub mod modules;
pub mod services;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::Config;
use modules::monitor::monitor_routes;
use services::events::BroadcastPublisher;
use services::log_sink::LogSink;
use services::monitor::{EngineSettings, MonitorEngine};
use services::transport::{HttpTransport, IncidentTransport, TransportError};

pub struct AppState {
    pub engine: MonitorEngine,
    pub events: BroadcastPublisher,
    pub log_sink: Arc<LogSink>,
    pub transport: Arc<dyn IncidentTransport>,
    pub log_tail_lines: usize,
    /// Fired on process shutdown; ends open event streams
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        transport: Arc<dyn IncidentTransport>,
        log_sink: Arc<LogSink>,
        events: BroadcastPublisher,
        settings: EngineSettings,
        log_tail_lines: usize,
    ) -> Self {
        let engine = MonitorEngine::new(
            transport.clone(),
            log_sink.clone(),
            Arc::new(events.clone()),
            settings,
        );

        Self {
            engine,
            events,
            log_sink,
            transport,
            log_tail_lines,
            shutdown: CancellationToken::new(),
        }
    }

    /// Wire the production HTTP transport from process configuration
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.trust_mode)?;

        Ok(Self::new(
            Arc::new(transport),
            Arc::new(LogSink::new(config.log_file.clone())),
            BroadcastPublisher::new(config.event_channel_capacity),
            EngineSettings {
                request_timeout: config.request_timeout,
                default_endpoint: config.default_endpoint.clone(),
            },
            config.log_tail_lines,
        ))
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", monitor_routes())
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Incident Monitor API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
