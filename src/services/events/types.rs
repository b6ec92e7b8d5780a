use serde::Serialize;
use serde_json::Value;

pub const TOPIC_STATUS_UPDATE: &str = "status_update";
pub const TOPIC_NEW_INCIDENTS: &str = "new_incidents";

/// Severity tag carried by status events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEvent {
    pub timestamp: String,
    pub message: String,
    #[serde(rename = "type")]
    pub level: StatusLevel,
}

/// Newly observed incidents: bounded preview plus the full count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEvent {
    pub timestamp: String,
    pub count: usize,
    pub incidents: Vec<Value>,
    pub response_status: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum MonitorEvent {
    StatusUpdate(StatusEvent),
    NewIncidents(ResultEvent),
}

impl MonitorEvent {
    pub fn status(level: StatusLevel, message: impl Into<String>) -> Self {
        Self::StatusUpdate(StatusEvent {
            timestamp: event_timestamp(),
            message: message.into(),
            level,
        })
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::status(StatusLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::status(StatusLevel::Error, message)
    }

    pub fn incidents(count: usize, incidents: Vec<Value>, response_status: u16) -> Self {
        Self::NewIncidents(ResultEvent {
            timestamp: event_timestamp(),
            count,
            incidents,
            response_status,
        })
    }

    pub fn topic(&self) -> &'static str {
        match self {
            Self::StatusUpdate(_) => TOPIC_STATUS_UPDATE,
            Self::NewIncidents(_) => TOPIC_NEW_INCIDENTS,
        }
    }

    /// Event body without the topic envelope
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::StatusUpdate(e) => serde_json::to_value(e),
            Self::NewIncidents(e) => serde_json::to_value(e),
        }
    }
}

fn event_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
