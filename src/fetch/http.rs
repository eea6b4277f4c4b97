use crate::content;
use crate::core::config;
use crate::core::error::FetchError;
use crate::core::result::{ExtractionResult, FetchMethod};
use crate::fetch::elapsed_ms;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (compatible; pagesieve/0.1)";

const MAX_REDIRECTS: usize = 10;

/// Tier 1: plain async GET with heuristic extraction.
///
/// Cheap and sufficient for static pages and most server-rendered sites.
/// Never returns an error: every outcome is an [`ExtractionResult`]
/// tagged `http`.
pub async fn fetch_http(url: &str) -> ExtractionResult {
    let start = Instant::now();
    debug!(url, "tier 1: plain HTTP fetch");

    let client = match Client::builder()
        .timeout(Duration::from_secs(config::http_timeout_secs()))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            let err = FetchError::Network(err.to_string());
            return ExtractionResult::failure(
                url,
                err.to_string(),
                Some(FetchMethod::Http),
                None,
                elapsed_ms(start),
            );
        }
    };

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => {
            let err = classify_transport(&err);
            return ExtractionResult::failure(
                url,
                err.to_string(),
                Some(FetchMethod::Http),
                None,
                elapsed_ms(start),
            );
        }
    };

    let status = response.status().as_u16();
    if status >= 400 {
        return ExtractionResult::failure(
            url,
            FetchError::Status { status }.to_string(),
            Some(FetchMethod::Http),
            Some(status),
            elapsed_ms(start),
        );
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !content_type.to_ascii_lowercase().contains("html") {
        return ExtractionResult::failure(
            url,
            FetchError::ContentType(content_type).to_string(),
            Some(FetchMethod::Http),
            Some(status),
            elapsed_ms(start),
        );
    }

    let raw = match response.bytes().await {
        Ok(raw) => raw,
        Err(err) => {
            let err = classify_transport(&err);
            return ExtractionResult::failure(
                url,
                err.to_string(),
                Some(FetchMethod::Http),
                Some(status),
                elapsed_ms(start),
            );
        }
    };

    let elapsed = elapsed_ms(start);
    let mut document = content::parse_document_bytes(&raw);
    let title = content::extract_title(&document);
    match content::extract_text_content(&mut document) {
        Some(body) => {
            ExtractionResult::success(url, title, body, FetchMethod::Http, Some(status), elapsed)
        }
        None => ExtractionResult::failure(
            url,
            FetchError::BodyTooShort.to_string(),
            Some(FetchMethod::Http),
            Some(status),
            elapsed,
        ),
    }
}

fn classify_transport(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::RequestTimeout
    } else if err.is_connect() {
        FetchError::Network(format!("connection failed: {err}"))
    } else {
        FetchError::Network(err.to_string())
    }
}
