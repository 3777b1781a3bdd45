use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a backend timestamp; anything unparsable is treated as absent.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).ok()
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

// Unparsable dates fall back to "unset" instead of failing the whole document
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

pub fn serialize_date<S>(date: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(d) => serializer.serialize_str(&format_date(d)),
        None => serializer.serialize_none(),
    }
}
