//! Null-safe deserializers for records coming from the persistence layer.
//!
//! Source rows are not trusted: numbers arrive as strings, dates in two
//! formats, and fields go missing. Anything unusable becomes `None` and the
//! normalizer substitutes its default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::String(raw)) => parse_datetime(&raw),
        _ => None,
    })
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(JsonValue::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// A missing, null or non-array collection reads as empty. Elements that do
/// not fit `T` are skipped.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Anything but a JSON object reads as `None`.
pub fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(object @ JsonValue::Object(_)) => serde_json::from_value(object).ok(),
        _ => None,
    })
}

pub fn lenient_object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_object(deserializer)?.unwrap_or_default())
}

/// Like [`lenient_datetime`] but a value that cannot be read is an error.
/// Used for oracle output, where a bad date means the payload is unusable.
pub fn flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized datetime: {raw}")))
}

fn number_from_value(value: &JsonValue) -> Option<f64> {
    let parsed = match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) and plain
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
