//! The tier-escalation pipeline.
//!
//! Each tier is an attempt to get usable content at minimum cost; this
//! module decides, from the failure kind and content quality, whether to
//! pay for the next one.

use crate::core::result::{ExtractionResult, FetchMethod};
use crate::fetch::{article, browser, http};
use std::time::Instant;
use tracing::info;

/// Extract the title and main body text of `url`.
///
/// Tiers, cheapest first:
/// 1. plain async HTTP GET with heuristic extraction;
/// 2. the readability article library on a worker pool;
/// 3. headless browser with scripting disabled (server-rendered markup);
/// 4. headless browser with scripting enabled (SPAs).
///
/// `max_tier` clamps escalation: 1 forbids all of it, 2 forbids the browser
/// tiers, 3 allows the scripting-disabled browser only, 4 allows everything.
///
/// Never returns an error: malformed URLs, DNS failures, HTTP errors, and
/// unparseable HTML all surface as failure results.
pub async fn extract(url: &str, max_tier: u8) -> ExtractionResult {
    let start = Instant::now();

    let tier1 = http::fetch_http(url).await;
    if tier1.success {
        return tier1;
    }
    if max_tier < 2 {
        return tier1;
    }

    if should_skip_to_browser(&tier1) && max_tier >= 3 {
        info!(
            url,
            status = tier1.status_code,
            "origin refused the plain fetch; skipping the article library"
        );
        return run_browser_tiers(url, start, max_tier).await;
    }

    let tier2 = article::fetch_article(url).await;
    if tier2.success {
        return tier2;
    }
    if max_tier < 3 {
        return tier2;
    }

    run_browser_tiers(url, start, max_tier).await
}

/// A 4xx/5xx answer means the article library would hit the same refusal
/// over the same HTTP. 403 and 429 are exempt: different headers or timing
/// can change the outcome.
fn should_skip_to_browser(result: &ExtractionResult) -> bool {
    match result.status_code {
        Some(status) => (400..600).contains(&status) && status != 403 && status != 429,
        None => false,
    }
}

/// Tier 3 first; escalate to tier 4 when it fails or when its body is a
/// "turn on JavaScript" stub. A tier-4 failure becomes the terminal result,
/// stamped with the overall pipeline time.
async fn run_browser_tiers(url: &str, overall_start: Instant, max_tier: u8) -> ExtractionResult {
    let tier3 = browser::fetch_browser_nojs(url).await;
    if tier3.success && !browser::requires_javascript(&tier3) {
        return tier3;
    }
    if max_tier < 4 {
        return tier3;
    }

    let tier4 = browser::fetch_browser(url).await;
    if tier4.success {
        return tier4;
    }

    let elapsed = overall_start.elapsed().as_millis() as u64;
    ExtractionResult::failure(
        url,
        format!(
            "All tiers failed: {}",
            tier4.error.as_deref().unwrap_or("unknown error")
        ),
        Some(FetchMethod::Browser),
        tier4.status_code,
        elapsed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure_with_status(status: Option<u16>) -> ExtractionResult {
        ExtractionResult::failure("https://example.com", "HTTP error", Some(FetchMethod::Http), status, 1)
    }

    #[test]
    fn skip_set_covers_hard_refusals() {
        for status in [400, 401, 404, 410, 418, 500, 502, 503, 599] {
            assert!(
                should_skip_to_browser(&failure_with_status(Some(status))),
                "{status} should skip the library tier"
            );
        }
    }

    #[test]
    fn retryable_statuses_keep_the_library_tier() {
        assert!(!should_skip_to_browser(&failure_with_status(Some(403))));
        assert!(!should_skip_to_browser(&failure_with_status(Some(429))));
    }

    #[test]
    fn statusless_failures_keep_the_library_tier() {
        // Network errors and timeouts carry no status; the library might
        // still get through.
        assert!(!should_skip_to_browser(&failure_with_status(None)));
        assert!(!should_skip_to_browser(&failure_with_status(Some(200))));
    }
}
