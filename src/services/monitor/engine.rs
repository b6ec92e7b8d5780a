use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::modules::monitor::model::{MonitorConfig, MonitorStatus};
use crate::services::events::EventPublisher;
use crate::services::log_sink::LogSink;
use crate::services::monitor::poller::Poller;
use crate::services::monitor::types::MonitorError;
use crate::services::transport::IncidentTransport;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub request_timeout: Duration,
    /// Used when a start request leaves `endpoint` empty
    pub default_endpoint: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            default_endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

struct ActiveRun {
    id: Uuid,
    config: MonitorConfig,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ActiveRun {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

/// Owns the single monitoring run: Idle until `start`, Running until `stop`.
///
/// Only one run exists at a time; a second `start` is rejected, not queued.
/// The run itself executes on its own tokio task, so status and stop calls
/// never wait on an in-flight API request.
pub struct MonitorEngine {
    transport: Arc<dyn IncidentTransport>,
    sink: Arc<LogSink>,
    publisher: Arc<dyn EventPublisher>,
    settings: EngineSettings,
    active: Mutex<Option<ActiveRun>>,
}

impl MonitorEngine {
    pub fn new(
        transport: Arc<dyn IncidentTransport>,
        sink: Arc<LogSink>,
        publisher: Arc<dyn EventPublisher>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            transport,
            sink,
            publisher,
            settings,
            active: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Validate `config` and launch the poll loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, mut config: MonitorConfig) -> Result<(), MonitorError> {
        let mut active = self.lock();

        if active.as_ref().is_some_and(ActiveRun::is_live) {
            return Err(MonitorError::AlreadyActive);
        }

        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(MonitorError::MissingFields(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }

        config
            .validate()
            .map_err(|e| MonitorError::InvalidConfig(e.to_string()))?;

        if config.endpoint.trim().is_empty() {
            config.endpoint = self.settings.default_endpoint.clone();
        }

        let poller = Poller::new(
            config.clone(),
            self.transport.clone(),
            self.sink.clone(),
            self.publisher.clone(),
            self.settings.request_timeout,
        )
        .map_err(|e| MonitorError::InvalidConfig(e.to_string()))?;

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let span = tracing::info_span!("monitor_run", run_id = %id, host = %config.host);
        let task = tokio::spawn(poller.run(cancel.clone()).instrument(span));

        tracing::info!(run_id = %id, host = %config.host, "Monitoring started");

        *active = Some(ActiveRun {
            id,
            config,
            cancel,
            task,
        });

        Ok(())
    }

    /// Signal the run to stop. Idempotent; returns whether a run was live.
    pub fn stop(&self) -> bool {
        match self.lock().take() {
            Some(run) => {
                let was_live = run.is_live();
                run.cancel.cancel();
                tracing::info!(run_id = %run.id, "Monitoring stopped");
                was_live
            }
            None => false,
        }
    }

    /// Stop and wait for the poll task to exit
    pub async fn shutdown(&self) {
        let run = self.lock().take();
        if let Some(run) = run {
            run.cancel.cancel();
            if let Err(e) = run.task.await {
                tracing::error!(run_id = %run.id, error = %e, "Poll task ended abnormally");
            }
        }
    }

    pub fn status(&self) -> MonitorStatus {
        match self.lock().as_ref() {
            Some(run) if run.is_live() => MonitorStatus::Running(run.config.clone()),
            _ => MonitorStatus::Idle,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
