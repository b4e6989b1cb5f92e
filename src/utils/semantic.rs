use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

/// Stable fingerprint of an oracle prompt, attached to response metadata and
/// logs so a degraded answer can be traced back to the exact input.
pub fn prompt_fingerprint(operation: &str, payload: &JsonValue) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(b":");
    if let Ok(serialized) = serde_json::to_vec(payload) {
        hasher.update(&serialized);
    }
    STANDARD_NO_PAD.encode(hasher.finalize())
}
