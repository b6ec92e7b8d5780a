use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_SEARCH_FROM: u64 = 0;
pub const DEFAULT_SEARCH_TO: u64 = 100;
pub const DEFAULT_SORT_FIELD: &str = "incident_id";
pub const DEFAULT_SORT_ORDER: &str = "desc";

/// Value that disables a filter field
pub const FILTER_ALL: &str = "all";

const REDACTED: &str = "***";

/// Configuration of one monitoring run.
///
/// Built once from the start request and never mutated while the run is active.
/// Every field is optional on the wire; form posts send numbers as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MonitorConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub api_key_id: String,
    pub api_key: String,
    pub host: String,
    pub endpoint: String,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    #[validate(range(min = 1, message = "polling_interval must be at least 1 second"))]
    pub polling_interval: u64,
    #[serde(flatten)]
    pub filters: QueryFilters,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_key_id: String::new(),
            api_key: String::new(),
            host: String::new(),
            endpoint: String::new(),
            polling_interval: DEFAULT_POLLING_INTERVAL_SECS,
            filters: QueryFilters::default(),
        }
    }
}

impl MonitorConfig {
    /// Names of required fields that are absent or empty, in declaration order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("api_key_id", &self.api_key_id),
            ("api_key", &self.api_key),
            ("host", &self.host),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Copy safe to hand back to status queries
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.api_key.is_empty() {
            config.api_key = REDACTED.to_string();
        }
        config
    }
}

/// Declarative incident filter set, rendered by the query builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilters {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub search_from: u64,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub search_to: u64,
    pub sort_field: String,
    pub sort_order: String,
    pub severity_filter: Option<String>,
    pub status_filter: Option<String>,
    pub time_filter: Option<String>,
    pub host_filter: Option<String>,
    pub description_filter: Option<String>,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            search_from: DEFAULT_SEARCH_FROM,
            search_to: DEFAULT_SEARCH_TO,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_order: DEFAULT_SORT_ORDER.to_string(),
            severity_filter: None,
            status_filter: None,
            time_filter: None,
            host_filter: None,
            description_filter: None,
        }
    }
}

/// Lifecycle state of the scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorStatus {
    Idle,
    Running(MonitorConfig),
}

impl MonitorStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn config(&self) -> Option<&MonitorConfig> {
        match self {
            Self::Idle => None,
            Self::Running(config) => Some(config),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom(format!("expected non-negative integer, got {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected non-negative integer, got {:?}", s))),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
