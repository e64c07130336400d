use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

/// Most responses carry one or two headers.
pub const MAX_INLINE_HEADERS: usize = 8;

pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response produced by [`Application::handle`](super::Application::handle).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// `Null` means no body
    pub body: Value,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200, HeaderVec::new(), Value::Null)
    }
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body)
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((
            Arc::from("content-type"),
            "text/plain; charset=utf-8".to_string(),
        ));
        Self::new(status, headers, Value::String(body.into()))
    }

    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), Value::Null)
    }

    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
    }

    /// Case-insensitive header lookup.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    /// Body rendered the way it would go on the wire.
    #[must_use]
    pub fn body_string(&self) -> String {
        match &self.body {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_set_content_type() {
        assert_eq!(
            Response::json(200, json!({})).get_header("Content-Type"),
            Some("application/json")
        );
        let text = Response::text(200, "hi");
        assert_eq!(text.get_header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(text.body_string(), "hi");
        assert_eq!(Response::empty(204).get_header("content-type"), None);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = Response::json(200, json!(1));
        res.set_header("Content-Type", "application/problem+json");
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("content-type"), Some("application/problem+json"));
    }

    #[test]
    fn test_error_body_and_reason() {
        let res = Response::error(404, "Not Found handler: XController");
        assert_eq!(res.body, json!({"error": "Not Found handler: XController"}));
        assert_eq!(res.reason(), "Not Found");
        assert_eq!(Response::empty(599).reason(), "Unknown");
    }

    #[test]
    fn test_serialized_form_skips_headers() {
        let res = Response::json(201, json!({"id": 1}));
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(value, json!({"status": 201, "body": {"id": 1}}));
    }
}
