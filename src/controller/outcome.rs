//! Action return values.
//!
//! When no view template is found for an action, the outcome is written to
//! the response body as-is.

use axum::http::HeaderValue;

/// Value returned by an action.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Outcome {
    /// No body.
    #[default]
    Empty,
    /// Plain text body.
    Text(String),
    /// Pre-rendered HTML body.
    Html(String),
    /// JSON document.
    Json(serde_json::Value),
}

impl Outcome {
    /// Content type used when the outcome becomes the response body.
    pub fn content_type(&self) -> Option<HeaderValue> {
        match self {
            Outcome::Empty => None,
            Outcome::Text(_) => Some(HeaderValue::from_static("text/plain; charset=utf-8")),
            Outcome::Html(_) => Some(HeaderValue::from_static("text/html; charset=utf-8")),
            Outcome::Json(_) => Some(HeaderValue::from_static("application/json")),
        }
    }

    /// Serialize into response body bytes.
    pub fn into_body(self) -> String {
        match self {
            Outcome::Empty => String::new(),
            Outcome::Text(s) | Outcome::Html(s) => s,
            Outcome::Json(v) => v.to_string(),
        }
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Empty
    }
}

impl From<String> for Outcome {
    fn from(s: String) -> Self {
        Outcome::Text(s)
    }
}

impl From<&str> for Outcome {
    fn from(s: &str) -> Self {
        Outcome::Text(s.to_string())
    }
}

impl From<serde_json::Value> for Outcome {
    fn from(v: serde_json::Value) -> Self {
        Outcome::Json(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body() {
        let outcome = Outcome::from(json!({"id": 7}));
        assert_eq!(outcome.content_type().unwrap(), "application/json");
        assert_eq!(outcome.into_body(), r#"{"id":7}"#);
    }

    #[test]
    fn test_empty_has_no_content_type() {
        let outcome = Outcome::from(());
        assert!(outcome.content_type().is_none());
        assert_eq!(outcome.into_body(), "");
    }
}
