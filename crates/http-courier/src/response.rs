//! Response normalization

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};

/// Body substituted when a parsed body comes back empty
pub const NO_RESPONSE_MESSAGE: &str = "No Response Received.";

/// Tag describing how a response body was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseType {
    /// Body parsed as a JSON structure
    #[serde(rename = "json")]
    Json,
    /// Body kept as raw text
    #[serde(rename = "html/xml")]
    HtmlXml,
}

impl ResponseType {
    /// The wire tag for this response type
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Json => "json",
            ResponseType::HtmlXml => "html/xml",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized, caller-facing result of a single exchange
///
/// Always produced, even when the transport failed outright; callers that
/// care about HTTP semantics inspect [`status_code`](Self::status_code)
/// themselves.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseRecord {
    /// HTTP status code; `None` when the transport never produced one
    pub status_code: Option<u16>,
    /// Parsed JSON structure, `[raw_text]`, or the no-response sentinel
    pub body: Value,
    /// How the body was interpreted
    pub response_type: ResponseType,
    /// Response headers flattened to strings
    pub headers: HashMap<String, String>,
    /// Cookies set during this exchange
    pub cookies: HashMap<String, String>,
    /// Wall-clock time from request start to normalization
    pub elapsed: Duration,
}

impl ResponseRecord {
    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        self.status_code.is_some_and(|s| (200..300).contains(&s))
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code.is_some_and(|s| (400..500).contains(&s))
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code.is_some_and(|s| (500..600).contains(&s))
    }
}

/// The sentinel body for exchanges that yielded nothing parseable
pub(crate) fn no_response_body() -> Value {
    json!([{ "message": NO_RESPONSE_MESSAGE }])
}

/// Interpret a raw response body
///
/// Backslash escaping is stripped before the JSON parse, matching upstream
/// services that double-escape their payloads. A body that parses but is
/// empty becomes the no-response sentinel; anything unparseable is wrapped
/// as a single-element array of raw text.
pub(crate) fn normalize_body(raw: &str) -> (Value, ResponseType) {
    match serde_json::from_str::<Value>(&strip_slashes(raw)) {
        Ok(value) if is_empty(&value) => (no_response_body(), ResponseType::Json),
        Ok(value) => (value, ResponseType::Json),
        Err(_) => (json!([raw]), ResponseType::HtmlXml),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Remove one level of backslash escaping
fn strip_slashes(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_json_object() {
        let (body, kind) = normalize_body(r#"{"name": "x", "count": 2}"#);
        assert_eq!(kind, ResponseType::Json);
        assert_eq!(body, json!({"name": "x", "count": 2}));
    }

    #[test]
    fn test_normalize_escaped_json() {
        let (body, kind) = normalize_body(r#"{\"name\": \"x\"}"#);
        assert_eq!(kind, ResponseType::Json);
        assert_eq!(body, json!({"name": "x"}));
    }

    #[test]
    fn test_normalize_html_falls_back_to_raw_text() {
        let raw = "<html><body>hello</body></html>";
        let (body, kind) = normalize_body(raw);
        assert_eq!(kind, ResponseType::HtmlXml);
        assert_eq!(body, json!([raw]));
    }

    #[test]
    fn test_normalize_empty_object_substitutes_sentinel() {
        let (body, kind) = normalize_body("{}");
        assert_eq!(kind, ResponseType::Json);
        assert_eq!(body, json!([{ "message": "No Response Received." }]));
    }

    #[test]
    fn test_normalize_empty_array_substitutes_sentinel() {
        let (body, _) = normalize_body("[]");
        assert_eq!(body, json!([{ "message": "No Response Received." }]));
    }

    #[test]
    fn test_normalize_json_null_substitutes_sentinel() {
        let (body, kind) = normalize_body("null");
        assert_eq!(kind, ResponseType::Json);
        assert_eq!(body, json!([{ "message": "No Response Received." }]));
    }

    #[test]
    fn test_strip_slashes_passthrough() {
        assert_eq!(strip_slashes("plain text"), "plain text");
    }

    #[test]
    fn test_strip_slashes_unescapes() {
        assert_eq!(strip_slashes(r#"\"quoted\""#), r#""quoted""#);
        assert_eq!(strip_slashes(r"a\\b"), r"a\b");
    }

    #[test]
    fn test_response_type_tags() {
        assert_eq!(ResponseType::Json.to_string(), "json");
        assert_eq!(ResponseType::HtmlXml.to_string(), "html/xml");
    }

    #[test]
    fn test_record_status_helpers() {
        let record = ResponseRecord {
            status_code: Some(204),
            body: json!([]),
            response_type: ResponseType::Json,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            elapsed: Duration::ZERO,
        };
        assert!(record.is_success());
        assert!(!record.is_client_error());

        let failed = ResponseRecord {
            status_code: None,
            ..record.clone()
        };
        assert!(!failed.is_success());
        assert!(!failed.is_server_error());
    }
}
