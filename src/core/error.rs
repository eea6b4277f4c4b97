use thiserror::Error;

/// Failure kinds a fetch tier can report.
///
/// The `Display` strings are the user-visible diagnostics carried in
/// [`ExtractionResult::error`](crate::core::result::ExtractionResult);
/// tiers never let these escape as real errors; each one is folded into a
/// failure result at the tier boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, TCP, TLS, or other transport failure before a response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// The whole-request deadline of the HTTP tier expired.
    #[error("Request timeout")]
    RequestTimeout,

    /// The origin answered with an error status.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// The response was not HTML.
    #[error("Non-HTML content type: {0}")]
    ContentType(String),

    /// The article-library tier exceeded its overall deadline.
    #[error("Readability timeout")]
    LibraryTimeout,

    /// The article library failed outright (fetch or parse).
    #[error("Readability error: {0}")]
    Library(String),

    /// The article library ran but produced no usable text.
    #[error("Body too short or extraction failed")]
    LibraryExtraction,

    /// Browser navigation exceeded its deadline.
    #[error("Navigation timeout")]
    NavigationTimeout,

    /// Parsing succeeded but the extracted body is under the minimum length.
    #[error("Body too short")]
    BodyTooShort,

    /// Headless-browser launch, protocol, or automation failure.
    #[error("Browser error: {0}")]
    Browser(String),
}

impl FetchError {
    /// HTTP status embedded in this error, where one was observed.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_diagnostics() {
        assert_eq!(FetchError::Status { status: 404 }.to_string(), "HTTP 404");
        assert_eq!(FetchError::BodyTooShort.to_string(), "Body too short");
        assert_eq!(FetchError::LibraryTimeout.to_string(), "Readability timeout");
        assert_eq!(
            FetchError::LibraryExtraction.to_string(),
            "Body too short or extraction failed"
        );
        assert_eq!(
            FetchError::ContentType("application/json".into()).to_string(),
            "Non-HTML content type: application/json"
        );
    }

    #[test]
    fn status_only_on_status_errors() {
        assert_eq!(FetchError::Status { status: 503 }.status(), Some(503));
        assert_eq!(FetchError::NavigationTimeout.status(), None);
        assert_eq!(FetchError::Network("reset".into()).status(), None);
    }
}
