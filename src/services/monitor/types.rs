use crate::services::log_sink::LogSinkError;
use crate::services::transport::TransportError;

/// Start rejections; returned synchronously, state unchanged
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MonitorError {
    #[error("Monitoring already active")]
    AlreadyActive,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure of a single tick; the loop retries on the next interval
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to write log: {0}")]
    Persistence(#[from] LogSinkError),
}

/// What one tick observed
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Novel response; `count` is `None` when the reply carried no incident list
    New { count: Option<usize> },
    Duplicate,
    Failed,
}
