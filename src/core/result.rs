use serde::Serialize;
use std::fmt;

/// Tag identifying which tier produced a result.
///
/// The wire strings are load-bearing: downstream log parsers match on them,
/// so they must never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FetchMethod {
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "library")]
    Library,
    #[serde(rename = "browser-nojs")]
    BrowserNoJs,
    #[serde(rename = "browser")]
    Browser,
}

impl FetchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMethod::Http => "http",
            FetchMethod::Library => "library",
            FetchMethod::BrowserNoJs => "browser-nojs",
            FetchMethod::Browser => "browser",
        }
    }
}

impl fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured outcome of an extraction attempt.
///
/// Every tier and the top-level pipeline return this record; nothing in the
/// fetch path raises. Construct through [`ExtractionResult::success`] /
/// [`ExtractionResult::failure`] so the field invariants hold:
///
/// * on success, `body` is present (at least 100 chars), `error` is absent,
///   and `content_length == body.chars().count()`
/// * on failure, `body` and `title` are absent, `content_length` is 0, and
///   `error` is present
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub url: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub error: Option<String>,
    pub fetch_method: Option<FetchMethod>,
    pub status_code: Option<u16>,
    pub content_length: usize,
    pub elapsed_ms: u64,
}

impl ExtractionResult {
    pub fn success(
        url: &str,
        title: Option<String>,
        body: String,
        fetch_method: FetchMethod,
        status_code: Option<u16>,
        elapsed_ms: u64,
    ) -> Self {
        let content_length = body.chars().count();
        Self {
            success: true,
            url: url.to_string(),
            title,
            body: Some(body),
            error: None,
            fetch_method: Some(fetch_method),
            status_code,
            content_length,
            elapsed_ms,
        }
    }

    pub fn failure(
        url: &str,
        error: impl Into<String>,
        fetch_method: Option<FetchMethod>,
        status_code: Option<u16>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            success: false,
            url: url.to_string(),
            title: None,
            body: None,
            error: Some(error.into()),
            fetch_method,
            status_code,
            content_length: 0,
            elapsed_ms,
        }
    }

    /// Plain JSON mapping of the record (all nine fields, absent optionals
    /// as `null`).
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Compact JSON string. Non-ASCII characters are emitted verbatim, not
    /// `\u`-escaped.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Pretty-printed JSON string, for the CLI `--raw` output.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_method_tags_are_stable() {
        assert_eq!(FetchMethod::Http.as_str(), "http");
        assert_eq!(FetchMethod::Library.as_str(), "library");
        assert_eq!(FetchMethod::BrowserNoJs.as_str(), "browser-nojs");
        assert_eq!(FetchMethod::Browser.as_str(), "browser");
    }

    #[test]
    fn success_carries_body_and_length() {
        let body = "x".repeat(150);
        let result = ExtractionResult::success(
            "https://example.com/a",
            Some("Title".to_string()),
            body.clone(),
            FetchMethod::Http,
            Some(200),
            42,
        );
        assert!(result.success);
        assert_eq!(result.body.as_deref(), Some(body.as_str()));
        assert_eq!(result.content_length, 150);
        assert!(result.error.is_none());
        assert_eq!(result.url, "https://example.com/a");
    }

    #[test]
    fn failure_zeroes_content_fields() {
        let result = ExtractionResult::failure(
            "https://example.com/a",
            "HTTP 500",
            Some(FetchMethod::Http),
            Some(500),
            7,
        );
        assert!(!result.success);
        assert!(result.body.is_none());
        assert!(result.title.is_none());
        assert_eq!(result.content_length, 0);
        assert_eq!(result.error.as_deref(), Some("HTTP 500"));
        assert_eq!(result.status_code, Some(500));
    }

    #[test]
    fn content_length_counts_chars_not_bytes() {
        let body = "é".repeat(120);
        let result = ExtractionResult::success(
            "https://example.com",
            None,
            body,
            FetchMethod::Library,
            None,
            0,
        );
        assert_eq!(result.content_length, 120);
    }

    #[test]
    fn json_shape_has_all_fields_and_nulls() {
        let result = ExtractionResult::failure("https://example.com", "boom", None, None, 3);
        let value = result.to_value();
        let object = value.as_object().expect("object");
        for key in [
            "success",
            "url",
            "title",
            "body",
            "error",
            "fetch_method",
            "status_code",
            "content_length",
            "elapsed_ms",
        ] {
            assert!(object.contains_key(key), "missing field {key}");
        }
        assert!(value["title"].is_null());
        assert!(value["fetch_method"].is_null());
        assert_eq!(value["content_length"], 0);
    }

    #[test]
    fn json_preserves_non_ascii_and_method_tag() {
        let body = format!("Καλημέρα κόσμε — article body. {}", "x".repeat(100));
        let result = ExtractionResult::success(
            "https://example.gr/νέα",
            Some("Καφές ☕".to_string()),
            body,
            FetchMethod::BrowserNoJs,
            Some(200),
            12,
        );
        let json = result.to_json();
        assert!(json.contains("Καφές ☕"));
        assert!(!json.contains("\\u"));
        assert!(json.contains("\"fetch_method\":\"browser-nojs\""));
    }

    #[test]
    fn results_compare_field_by_field() {
        let a = ExtractionResult::failure("u", "e", Some(FetchMethod::Browser), Some(404), 1);
        let b = ExtractionResult::failure("u", "e", Some(FetchMethod::Browser), Some(404), 1);
        assert_eq!(a, b);
        let c = ExtractionResult::failure("u", "e", Some(FetchMethod::Browser), Some(404), 2);
        assert_ne!(a, c);
    }
}
