//! Redaction of secrets before arguments or backend bodies reach the log

use serde_json::{Map, Value as JsonValue};

/// Argument names whose values are always masked
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "passwd",
    "token",
    "access_token",
    "refresh_token",
    "auth_token",
    "bearer_token",
    "authorization",
    "api_key",
    "secret",
    "client_secret",
    "credential",
    "credentials",
    "ssn",
];

/// Substrings that mark a name as sensitive (case-insensitive)
const SENSITIVE_PATTERNS: &[&str] = &["_key", "_token", "_secret", "_password"];

pub const REDACTED: &str = "***REDACTED***";

/// Longest string value kept verbatim in a log line
const MAX_LOGGED_STRING: usize = 256;

pub fn is_sensitive_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    SENSITIVE_FIELDS.iter().any(|s| lower == *s)
        || SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Copy of `value` with sensitive fields masked and long strings shortened
pub fn sanitize_json_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(sanitize_map(map)),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(sanitize_json_value).collect()),
        JsonValue::String(s) if s.chars().count() > MAX_LOGGED_STRING => {
            let head: String = s.chars().take(MAX_LOGGED_STRING).collect();
            JsonValue::String(format!("{}...", head))
        }
        other => other.clone(),
    }
}

pub fn sanitize_map(map: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    map.iter()
        .map(|(key, val)| {
            let sanitized = if is_sensitive_field(key) && !(val.is_object() || val.is_array()) {
                JsonValue::String(REDACTED.to_string())
            } else {
                sanitize_json_value(val)
            };
            (key.clone(), sanitized)
        })
        .collect()
}

/// Mask every occurrence of `secret` in free text, e.g. a transport error message
pub fn scrub_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, REDACTED)
}
