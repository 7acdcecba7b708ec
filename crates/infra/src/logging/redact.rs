//! Secret redaction for logged headers and bodies
//!
//! Redaction only ever touches the rendered log text; requests and
//! responses are never modified.

use reqwest::header::HeaderMap;
use serde_json::Value;

/// Replacement for every redacted value
pub const REDACTED: &str = "***";

const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-api-key"];

const SENSITIVE_FIELDS: &[&str] = &["client_secret", "access_token", "refresh_token", "password"];

pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

pub fn is_sensitive_field(name: &str) -> bool {
    SENSITIVE_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(name))
}

/// Render headers as `name: value` pairs with secrets masked.
pub fn redact_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive_header(name.as_str()) {
                REDACTED
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            format!("{}: {}", name.as_str(), value)
        })
        .collect()
}

/// Render a body for logging.
///
/// JSON bodies have sensitive fields masked at any depth. Form-encoded
/// bodies have sensitive pairs masked. Other text passes through, and
/// non-UTF-8 bodies become a byte count.
pub fn redact_body(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }

    let Ok(text) = std::str::from_utf8(body) else {
        return format!("<{} bytes>", body.len());
    };

    if let Ok(mut json) = serde_json::from_str::<Value>(text) {
        if json.is_object() || json.is_array() {
            redact_json(&mut json);
            return json.to_string();
        }
    }

    if looks_like_form(text) {
        return redact_form(text);
    }

    text.to_string()
}

fn redact_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if is_sensitive_field(key) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact_json(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}

fn looks_like_form(text: &str) -> bool {
    text.contains('=') && !text.chars().any(char::is_whitespace)
}

fn redact_form(text: &str) -> String {
    text.split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if form_key_is_sensitive(key) => format!("{key}={REDACTED}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn form_key_is_sensitive(key: &str) -> bool {
    let plus_decoded = key.replace('+', " ");
    urlencoding::decode(&plus_decoded).map(|k| is_sensitive_field(&k)).unwrap_or(false)
}
