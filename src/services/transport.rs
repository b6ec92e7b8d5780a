use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::services::signing::SignedHeaders;

/// How server certificates are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrustMode {
    #[default]
    Verify,
    /// Skip certificate and hostname checks, for self-signed internal endpoints
    AcceptInvalid,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Invalid header {0}")]
    InvalidHeader(String),
    #[error("Client error: {0}")]
    Client(String),
}

/// Raw reply from the incident API, body already decompressed
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait IncidentTransport: Send + Sync {
    /// POST `payload` to `host + endpoint`.
    /// Non-2xx statuses are returned as responses, not errors.
    async fn execute(
        &self,
        host: &str,
        endpoint: &str,
        payload: &Value,
        headers: &SignedHeaders,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(trust_mode: TrustMode) -> Result<Self, TransportError> {
        let mut builder = Client::builder().gzip(true);

        if trust_mode == TrustMode::AcceptInvalid {
            tracing::warn!("TLS certificate and hostname verification disabled for incident API calls");
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl IncidentTransport for HttpTransport {
    async fn execute(
        &self,
        host: &str,
        endpoint: &str,
        payload: &Value,
        headers: &SignedHeaders,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let url = request_url(host, endpoint);

        let response = self
            .client
            .post(&url)
            .headers(header_map(headers)?)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;

        tracing::debug!(url = %url, status, bytes = body.len(), "incident API responded");

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// `host` may carry its own scheme; bare hosts are reached over https
pub fn request_url(host: &str, endpoint: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    let base = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    if endpoint.is_empty() || endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    }
}

fn header_map(headers: &SignedHeaders) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers.pairs() {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|_| TransportError::InvalidHeader(name.to_string()))?;
        map.insert(header, value);
    }
    Ok(map)
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}
