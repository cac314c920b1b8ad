//! Accessors for untyped remote records.
//!
//! Remote records are JSON objects whose fields may be missing, null, or
//! of a looser type than expected (numbers sent as strings and the
//! reverse). Every accessor here takes an explicit default so the mapping
//! tables stay readable.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::dates;

/// One record as returned by the remote API.
pub type RawRecord = serde_json::Map<String, Value>;

/// The field rendered as text, `None` when absent or null.
pub fn display(raw: &RawRecord, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// The field as text, or `default` when absent or null.
pub fn text_or(raw: &RawRecord, key: &str, default: &str) -> String {
    display(raw, key).unwrap_or_else(|| default.to_string())
}

/// The field as text, or `""`.
pub fn text(raw: &RawRecord, key: &str) -> String {
    text_or(raw, key, "")
}

/// The field as an optional string, keeping absence distinct from `""`.
pub fn opt_text(raw: &RawRecord, key: &str) -> Option<String> {
    display(raw, key)
}

/// The field as an integer, or `default`.
pub fn integer_or(raw: &RawRecord, key: &str, default: i64) -> i64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// The field as a boolean, or `default`.
pub fn flag_or(raw: &RawRecord, key: &str, default: bool) -> bool {
    match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => true,
            "false" | "f" | "0" => false,
            _ => default,
        },
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(default),
        _ => default,
    }
}

/// The field parsed as a date-time; unset on absence or parse failure.
pub fn date(raw: &RawRecord, key: &str) -> Option<DateTime<Utc>> {
    match raw.get(key)? {
        Value::String(s) => dates::parse_flexible(s),
        _ => None,
    }
}

/// The integer identity stored under `key`, `None` when absent, null, or
/// not an integer.
pub fn identity(raw: &RawRecord, key: &str) -> Option<i64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn text_defaults_on_absent_and_null() {
        let raw = record(json!({"name": "Ana", "title": null, "country_id": 42}));
        assert_eq!(text(&raw, "name"), "Ana");
        assert_eq!(text(&raw, "title"), "");
        assert_eq!(text(&raw, "email"), "");
        assert_eq!(text(&raw, "country_id"), "42");
    }

    #[test]
    fn integers_accept_numeric_strings() {
        let raw = record(json!({"a": 3, "b": "17", "c": "x", "d": null}));
        assert_eq!(integer_or(&raw, "a", 0), 3);
        assert_eq!(integer_or(&raw, "b", 0), 17);
        assert_eq!(integer_or(&raw, "c", 0), 0);
        assert_eq!(integer_or(&raw, "d", 5), 5);
    }

    #[test]
    fn flags_default_when_unrecognised() {
        let raw = record(json!({"a": true, "b": "false", "c": null, "d": "maybe"}));
        assert!(flag_or(&raw, "a", false));
        assert!(!flag_or(&raw, "b", true));
        assert!(flag_or(&raw, "c", true));
        assert!(!flag_or(&raw, "d", false));
    }

    #[test]
    fn dates_are_unset_on_garbage() {
        let raw = record(json!({"ok": "2024-01-02T00:00:00Z", "bad": "yesterday", "num": 5}));
        assert!(date(&raw, "ok").is_some());
        assert!(date(&raw, "bad").is_none());
        assert!(date(&raw, "num").is_none());
        assert!(date(&raw, "missing").is_none());
    }

    #[test]
    fn identity_requires_an_integer() {
        let raw = record(json!({"id": 7, "sid": "8", "bad": "x", "nil": null}));
        assert_eq!(identity(&raw, "id"), Some(7));
        assert_eq!(identity(&raw, "sid"), Some(8));
        assert_eq!(identity(&raw, "bad"), None);
        assert_eq!(identity(&raw, "nil"), None);
        assert_eq!(identity(&raw, "missing"), None);
    }
}
