//! Canonical JSON serialization and topology digest computation.
//!
//! Two synth runs over the same inputs must produce byte-identical
//! templates, so the digest is computed over canonical JSON: object keys
//! recursively sorted, compact encoding, SHA-256 hex.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, TopologyError};

/// Recursively sort JSON object keys.
fn sort_keys(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), sort_keys(v));
                }
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sort_keys).collect())
        }
        other => other.clone(),
    }
}

/// Canonical compact JSON encoding of any serializable value.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let raw = serde_json::to_value(value)?;
    serde_json::to_string(&sort_keys(&raw)).map_err(TopologyError::from)
}

/// SHA-256 hex digest of the canonical JSON encoding.
pub fn topology_digest<T: Serialize>(value: &T) -> Result<String> {
    let canonical = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
