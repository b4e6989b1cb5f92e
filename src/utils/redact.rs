use serde_json::Value as JsonValue;

/// Masks free-text and personal fields before an oracle payload is logged.
/// Numeric metrics, statuses and ids are kept so the log stays useful.
pub fn redact_sensitive_data(data: &JsonValue) -> JsonValue {
    match data {
        JsonValue::Object(map) => {
            let mut redacted_map = serde_json::Map::new();
            for (key, val) in map {
                let redacted_val = if is_sensitive_field(key) {
                    redact_leaf(val)
                } else {
                    redact_sensitive_data(val)
                };
                redacted_map.insert(key.clone(), redacted_val);
            }
            JsonValue::Object(redacted_map)
        }
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(redact_sensitive_data).collect())
        }
        _ => data.clone(),
    }
}

fn is_sensitive_field(field_name: &str) -> bool {
    let lower = field_name.to_lowercase();
    matches!(
        lower.as_str(),
        "name"
            | "title"
            | "description"
            | "assignedto"
            | "assigned_to"
            | "email"
            | "role"
            | "notes"
            | "comment"
    )
}

fn redact_leaf(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) if !s.is_empty() => JsonValue::String("[REDACTED]".to_string()),
        _ => value.clone(),
    }
}
