//! Canonical JSON + SHA-256 helpers shared by settings and config snapshots.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Recursively sort object keys so serialization does not depend on the
/// insertion order of the source document.
pub fn canonicalize(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

pub fn canonical_string(v: &Value) -> String {
    serde_json::to_string(&canonicalize(v.clone())).unwrap_or_default()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
