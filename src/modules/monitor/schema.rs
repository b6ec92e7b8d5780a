use serde::{Deserialize, Serialize};

use super::model::MonitorConfig;

// =============================================================================
// START / STOP
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MonitoringStatusResponse {
    pub active: bool,
    /// Active run configuration with the key redacted; `{}` when idle
    pub config: serde_json::Value,
}

// =============================================================================
// LOGS
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// TEST CONNECTION
// =============================================================================

pub type TestConnectionRequest = MonitorConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
}

impl TestConnectionResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status_code: None,
            response_preview: None,
        }
    }
}
