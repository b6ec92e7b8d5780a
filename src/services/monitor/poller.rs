use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::modules::monitor::model::MonitorConfig;
use crate::services::events::{EventPublisher, MonitorEvent, StatusLevel};
use crate::services::log_sink::LogSink;
use crate::services::monitor::dedup::{DedupCache, Fingerprint};
use crate::services::monitor::types::{PollError, TickOutcome};
use crate::services::query;
use crate::services::signing;
use crate::services::transport::IncidentTransport;

/// Incidents included in a result event preview
pub const PREVIEW_LIMIT: usize = 10;

/// Body of one monitoring run: poll, dedup, persist, publish, sleep.
///
/// Owns its dedup cache; nothing else touches it.
pub struct Poller {
    config: MonitorConfig,
    payload: Value,
    transport: Arc<dyn IncidentTransport>,
    sink: Arc<LogSink>,
    publisher: Arc<dyn EventPublisher>,
    dedup: DedupCache,
    request_timeout: Duration,
}

impl Poller {
    /// Renders the query once; every tick reuses it.
    pub fn new(
        config: MonitorConfig,
        transport: Arc<dyn IncidentTransport>,
        sink: Arc<LogSink>,
        publisher: Arc<dyn EventPublisher>,
        request_timeout: Duration,
    ) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_value(query::build_payload(&config))?;

        Ok(Self {
            config,
            payload,
            transport,
            sink,
            publisher,
            dedup: DedupCache::new(),
            request_timeout,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.config.polling_interval.max(1))
    }

    /// Loop until `cancel` fires. A stop request interrupts both an in-flight
    /// tick and the inter-tick sleep.
    pub async fn run(mut self, cancel: CancellationToken) {
        let interval = self.interval();
        tracing::info!(
            host = %self.config.host,
            interval_secs = interval.as_secs(),
            "Incident poller started"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.tick() => outcome,
            };
            tracing::debug!(?outcome, seen = self.dedup.len(), "Tick finished");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        tracing::info!(host = %self.config.host, "Incident poller stopped");
    }

    /// One poll. Failures are reported and persisted, never propagated.
    pub async fn tick(&mut self) -> TickOutcome {
        self.publisher.publish(MonitorEvent::info(format!(
            "Polling {} for incidents...",
            self.config.host
        )));

        match self.poll_once().await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("Error during API call: {}", e);
                tracing::error!(host = %self.config.host, error = %e, "Incident poll failed");

                self.publisher.publish(MonitorEvent::error(message.clone()));
                if let Err(log_err) = self.sink.append_text(&message).await {
                    let err = PollError::from(log_err);
                    tracing::error!(error = %err, "Failed to persist poll error");
                    self.publisher.publish(MonitorEvent::error(err.to_string()));
                }

                TickOutcome::Failed
            }
        }
    }

    async fn poll_once(&mut self) -> Result<TickOutcome, PollError> {
        let headers = signing::sign_now(&self.config.api_key_id, &self.config.api_key);

        let response = self
            .transport
            .execute(
                &self.config.host,
                &self.config.endpoint,
                &self.payload,
                &headers,
                self.request_timeout,
            )
            .await?;

        let document: Value = serde_json::from_slice(&response.body)?;
        let fingerprint = Fingerprint::of_document(&document)?;

        if self.dedup.is_duplicate(&fingerprint) {
            tracing::debug!(%fingerprint, "Duplicate response suppressed");
            self.publisher
                .publish(MonitorEvent::info("Duplicate log detected, skipping..."));
            return Ok(TickOutcome::Duplicate);
        }
        self.dedup.record(fingerprint);

        if let Err(e) = self.sink.append_json(&document).await {
            let err = PollError::from(e);
            tracing::error!(error = %err, "Failed to persist incident response");
            self.publisher.publish(MonitorEvent::error(err.to_string()));
        }

        let incidents = document
            .get("reply")
            .and_then(|reply| reply.get("incidents"))
            .and_then(Value::as_array);

        match incidents {
            Some(list) => {
                let count = list.len();
                let preview = list.iter().take(PREVIEW_LIMIT).cloned().collect();

                tracing::info!(count, status = response.status, "New incident response");
                self.publisher
                    .publish(MonitorEvent::incidents(count, preview, response.status));
                self.publisher.publish(MonitorEvent::status(
                    StatusLevel::Success,
                    format!("Found {} incidents", count),
                ));

                Ok(TickOutcome::New { count: Some(count) })
            }
            None => {
                self.publisher
                    .publish(MonitorEvent::status(StatusLevel::Warning, "No incidents found"));
                Ok(TickOutcome::New { count: None })
            }
        }
    }
}
