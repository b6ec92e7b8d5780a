use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

pub const NONCE_LENGTH: usize = 64;

pub const HEADER_TIMESTAMP: &str = "x-xdr-timestamp";
pub const HEADER_NONCE: &str = "x-xdr-nonce";
pub const HEADER_AUTH_ID: &str = "x-xdr-auth-id";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Per-request authentication headers for the incident API.
///
/// A fresh value must be produced for every request; the remote side rejects
/// replayed nonces and stale timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub timestamp_ms: i64,
    pub nonce: String,
    pub key_id: String,
    pub signature: String,
}

impl SignedHeaders {
    /// Header name/value pairs in the order they are sent.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (HEADER_TIMESTAMP, self.timestamp_ms.to_string()),
            (HEADER_NONCE, self.nonce.clone()),
            (HEADER_AUTH_ID, self.key_id.clone()),
            (HEADER_AUTHORIZATION, self.signature.clone()),
            (HEADER_ACCEPT_ENCODING, "gzip".to_string()),
            (HEADER_CONTENT_TYPE, "application/json".to_string()),
        ]
    }
}

/// Sign a request at the given instant.
/// signature = hex(sha256(key || nonce || timestamp_ms))
pub fn sign(key_id: &str, key: &str, now: DateTime<Utc>) -> SignedHeaders {
    let nonce = generate_nonce();
    let timestamp_ms = now.timestamp_millis();
    let signature = compute_signature(key, &nonce, timestamp_ms);

    SignedHeaders {
        timestamp_ms,
        nonce,
        key_id: key_id.to_string(),
        signature,
    }
}

pub fn sign_now(key_id: &str, key: &str) -> SignedHeaders {
    sign(key_id, key, Utc::now())
}

pub fn compute_signature(key: &str, nonce: &str, timestamp_ms: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(timestamp_ms.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Random alphanumeric nonce from the thread-local CSPRNG
fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}
