use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

/// Hex SHA-256 of a response document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Hash of the compact re-serialization of the whole decoded document.
    /// Object keys serialize sorted, so equal documents hash equally.
    pub fn of_document(document: &Value) -> Result<Self, serde_json::Error> {
        Ok(Self::of_bytes(&serde_json::to_vec(document)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprints seen since the run started.
///
/// Never evicts: a response identical to any earlier one is suppressed for
/// the rest of the run.
#[derive(Debug, Default)]
pub struct DedupCache {
    seen: HashSet<Fingerprint>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_duplicate(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    pub fn record(&mut self, fingerprint: Fingerprint) {
        self.seen.insert(fingerprint);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
