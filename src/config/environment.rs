use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::events::DEFAULT_EVENT_CAPACITY;
use crate::services::transport::TrustMode;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
pub const DEFAULT_LOG_FILE: &str = "./logs/pa.json";
pub const DEFAULT_ENDPOINT: &str = "/public_api/v1/incidents/get_incidents";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_TAIL_LINES: usize = 50;

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub log_file: PathBuf,
    pub default_endpoint: String,
    pub request_timeout: Duration,
    pub trust_mode: TrustMode,
    pub event_channel_capacity: usize,
    pub log_tail_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            default_endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            trust_mode: TrustMode::Verify,
            event_channel_capacity: DEFAULT_EVENT_CAPACITY,
            log_tail_lines: DEFAULT_LOG_TAIL_LINES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let log_file = lookup("LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        let default_endpoint = lookup("DEFAULT_ENDPOINT").unwrap_or(defaults.default_endpoint);

        let timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be at least 1".to_string());
        }

        let trust_mode = match lookup("TLS_VERIFY") {
            None => TrustMode::Verify,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => TrustMode::Verify,
                "0" | "false" | "no" => TrustMode::AcceptInvalid,
                other => return Err(format!("TLS_VERIFY must be true or false, got {:?}", other)),
            },
        };

        let event_channel_capacity = parse_var(&lookup, "EVENT_CHANNEL_CAPACITY", DEFAULT_EVENT_CAPACITY)?;
        let log_tail_lines = parse_var(&lookup, "LOG_TAIL_LINES", DEFAULT_LOG_TAIL_LINES)?;

        Ok(Self {
            bind_addr,
            log_file,
            default_endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
            trust_mode,
            event_channel_capacity,
            log_tail_lines,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a non-negative integer, got {:?}", key, raw)),
    }
}
