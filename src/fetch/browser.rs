use crate::content;
use crate::content::classifiers::MIN_BODY_LENGTH;
use crate::core::config;
use crate::core::error::FetchError;
use crate::core::result::{ExtractionResult, FetchMethod};
use crate::fetch::{browser_manager, elapsed_ms};
use chromiumoxide::cdp::browser_protocol::emulation::SetScriptExecutionDisabledParams;
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use readability::extractor;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

/// Process-wide cap on in-flight headless-browser sessions, shared by both
/// modes. Acquired before launch, released (by drop) after close.
const MAX_CONCURRENT_BROWSERS: usize = 3;
static BROWSER_PERMITS: Semaphore = Semaphore::const_new(MAX_CONCURRENT_BROWSERS);

/// Realistic desktop UA for the scripting-enabled mode; plenty of SPAs
/// serve an empty shell to anything that looks automated.
const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// How long the scripting-enabled mode waits for the page to settle after
/// navigation, and after a consent click.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);
const CONSENT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for the document response event after navigation.
const STATUS_EVENT_TIMEOUT: Duration = Duration::from_millis(1_500);

/// Phrases that mark a scripting-disabled render as inadequate.
const JS_REQUIRED_PHRASES: &[&str] = &[
    "requires javascript",
    "enable javascript",
    "javascript is required",
    "javascript is disabled",
    "javascript must be enabled",
    "you need to enable javascript",
    "please enable javascript",
    "this site requires javascript",
    "this page requires javascript",
    "this application requires javascript",
    "browser does not support javascript",
    "turn on javascript",
    "activate javascript",
];

/// One-shot consent sweep run inside the page: walk a single prioritised
/// matcher list (button text labels interleaved with id/attribute
/// selectors, in order), click the first visible match, report whether
/// anything was clicked.
const COOKIE_CONSENT_SCRIPT: &str = r#"
(function () {
    'use strict';

    // Tried strictly in order; the first visible match wins.
    var matchers = [
        { label: 'accept all' },
        { label: 'accept' },
        { css: '#onetrust-accept-btn-handler' },
        { css: '.accept-cookies' },
        { label: 'i agree' },
        { label: 'allow all' },
        { label: 'ok' },
        { label: 'got it' },
        { label: 'agree' },
        { css: '[data-testid="cookie-accept"]' },
        { label: 'continue' },
    ];

    function visible(el) {
        if (!el) return false;
        var rect = el.getBoundingClientRect();
        if (rect.width === 0 || rect.height === 0) return false;
        var style = window.getComputedStyle(el);
        return style.display !== 'none' && style.visibility !== 'hidden';
    }

    var buttons = document.querySelectorAll(
        'button, [role="button"], input[type="button"], input[type="submit"]'
    );

    function byLabel(label) {
        for (var i = 0; i < buttons.length; i++) {
            var text = (buttons[i].innerText || buttons[i].value || '')
                .trim().toLowerCase();
            if (text === label && visible(buttons[i])) return buttons[i];
        }
        return null;
    }

    for (var m = 0; m < matchers.length; m++) {
        try {
            var el;
            if (matchers[m].css) {
                el = document.querySelector(matchers[m].css);
                if (!visible(el)) continue;
            } else {
                el = byLabel(matchers[m].label);
                if (!el) continue;
            }
            el.click();
            return true;
        } catch (e) { /* bad selector or stale node: try the next matcher */ }
    }
    return false;
})()
"#;

/// Tier 3: headless browser with scripting disabled.
///
/// Captures server-rendered markup without paying for hydration and without
/// tripping over broken scripts.
pub async fn fetch_browser_nojs(url: &str) -> ExtractionResult {
    fetch_page(url, false).await
}

/// Tier 4: headless browser with scripting enabled; the full browser for
/// SPAs and client-rendered pages.
pub async fn fetch_browser(url: &str) -> ExtractionResult {
    fetch_page(url, true).await
}

/// Whether an extracted body reads like a "turn on JavaScript" stub.
pub fn requires_javascript(result: &ExtractionResult) -> bool {
    let Some(body) = &result.body else {
        return false;
    };
    let lower = body.to_lowercase();
    JS_REQUIRED_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

async fn fetch_page(url: &str, js_enabled: bool) -> ExtractionResult {
    let start = Instant::now();
    let method = if js_enabled {
        FetchMethod::Browser
    } else {
        FetchMethod::BrowserNoJs
    };
    info!(url, js_enabled, "browser tier fetch");

    let _permit = match BROWSER_PERMITS.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            return ExtractionResult::failure(
                url,
                FetchError::Browser("permit pool closed".to_string()).to_string(),
                Some(method),
                None,
                elapsed_ms(start),
            );
        }
    };

    match render_page(url, js_enabled).await {
        Ok((html, status)) => extract_from_html(url, &html, status, elapsed_ms(start), method),
        Err(err) => {
            ExtractionResult::failure(url, err.to_string(), Some(method), err.status(), elapsed_ms(start))
        }
    }
}

/// Launch, drive, and tear down one browser session around `drive_page`,
/// so cleanup runs on success and failure alike.
async fn render_page(url: &str, js_enabled: bool) -> Result<(String, Option<u16>), FetchError> {
    let (mut browser, event_loop) = browser_manager::launch()
        .await
        .map_err(|e| FetchError::Browser(e.to_string()))?;

    let outcome = drive_page(&browser, url, js_enabled).await;

    if let Err(e) = browser.close().await {
        warn!("browser close error (non-fatal): {}", e);
    }
    event_loop.abort();

    outcome
}

async fn drive_page(
    browser: &Browser,
    url: &str,
    js_enabled: bool,
) -> Result<(String, Option<u16>), FetchError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| FetchError::Browser(format!("failed to open page: {e}")))?;

    if js_enabled {
        page.set_user_agent(DESKTOP_USER_AGENT)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to set user agent: {e}")))?;
    } else {
        page.execute(SetScriptExecutionDisabledParams::new(true))
            .await
            .map_err(|e| FetchError::Browser(format!("failed to disable scripting: {e}")))?;
    }

    // Listen before navigating: the document response is the first thing
    // this stream sees.
    let mut responses = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(|e| FetchError::Browser(format!("failed to observe network: {e}")))?;

    let deadline = Duration::from_secs(config::navigation_timeout_secs());
    match tokio::time::timeout(deadline, page.goto(url)).await {
        Err(_) => return Err(FetchError::NavigationTimeout),
        Ok(Err(e)) => return Err(FetchError::Browser(format!("navigation failed: {e}"))),
        Ok(Ok(_)) => {}
    }

    let status = tokio::time::timeout(STATUS_EVENT_TIMEOUT, responses.next())
        .await
        .ok()
        .flatten()
        .map(|event| event.response.status as u16);

    if js_enabled {
        // Best-effort: plenty of sites hold sockets open forever, so a page
        // that never settles is not an error.
        wait_for_settle(&page, SETTLE_TIMEOUT).await;
    }

    if let Some(status) = status {
        if status >= 400 {
            return Err(FetchError::Status { status });
        }
    }

    if js_enabled {
        dismiss_cookie_consent(&page).await;
    }

    page.content()
        .await
        .map(|html| (html, status))
        .map_err(|e| FetchError::Browser(format!("failed to capture page content: {e}")))
}

/// Poll the serialized DOM size until it holds still for two rounds or the
/// deadline passes. Errors end the wait quietly.
async fn wait_for_settle(page: &Page, max_wait: Duration) {
    let deadline = Instant::now() + max_wait;
    let mut last_len = 0u64;
    let mut stable_rounds = 0u32;

    while Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let len = match page
            .evaluate("document.documentElement.outerHTML.length")
            .await
        {
            Ok(result) => result.into_value::<u64>().unwrap_or(0),
            Err(_) => return,
        };
        if len > 0 && len == last_len {
            stable_rounds += 1;
            if stable_rounds >= 2 {
                return;
            }
        } else {
            stable_rounds = 0;
            last_len = len;
        }
    }
}

/// Click away at most one cookie-consent banner, then give the page a
/// moment to settle. All failures are swallowed.
async fn dismiss_cookie_consent(page: &Page) {
    let clicked = match page.evaluate(COOKIE_CONSENT_SCRIPT).await {
        Ok(result) => result.into_value::<bool>().unwrap_or(false),
        Err(e) => {
            debug!("cookie consent probe failed: {}", e);
            false
        }
    };
    if clicked {
        debug!("cookie consent banner dismissed");
        wait_for_settle(page, CONSENT_SETTLE_TIMEOUT).await;
    }
}

/// Hybrid extraction of rendered HTML: readability first, the in-house
/// heuristics as fallback, title always from the rendered tree.
fn extract_from_html(
    url: &str,
    html: &str,
    status: Option<u16>,
    elapsed_ms: u64,
    method: FetchMethod,
) -> ExtractionResult {
    let body = try_readability(url, html).or_else(|| try_heuristic(html));
    let Some(body) = body else {
        return ExtractionResult::failure(
            url,
            FetchError::BodyTooShort.to_string(),
            Some(method),
            status,
            elapsed_ms,
        );
    };

    let document = content::parse_document(html);
    let title = content::extract_title(&document);
    ExtractionResult::success(url, title, body, method, status, elapsed_ms)
}

fn try_readability(url: &str, html: &str) -> Option<String> {
    let base = Url::parse(url).ok()?;
    let product = extractor::extract(&mut html.as_bytes(), &base).ok()?;
    let text = product.text;
    (text.chars().count() >= MIN_BODY_LENGTH).then_some(text)
}

fn try_heuristic(html: &str) -> Option<String> {
    let mut document = content::parse_document(html);
    content::extract_text_content(&mut document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success_with_body(body: &str) -> ExtractionResult {
        ExtractionResult::success(
            "https://example.com",
            None,
            body.to_string(),
            FetchMethod::BrowserNoJs,
            Some(200),
            0,
        )
    }

    #[test]
    fn permit_pool_has_three_slots() {
        assert_eq!(BROWSER_PERMITS.available_permits(), MAX_CONCURRENT_BROWSERS);
    }

    #[test]
    fn consent_matchers_keep_priority_order() {
        // Text labels come before the onetrust/accept-cookies selectors,
        // which come before the remaining labels; dismissal clicks whatever
        // matches first.
        let pos = |needle: &str| COOKIE_CONSENT_SCRIPT.find(needle).expect("matcher present");
        assert!(pos("{ label: 'accept all' }") < pos("{ label: 'accept' }"));
        assert!(pos("{ label: 'accept' }") < pos("#onetrust-accept-btn-handler"));
        assert!(pos("#onetrust-accept-btn-handler") < pos(".accept-cookies"));
        assert!(pos(".accept-cookies") < pos("{ label: 'i agree' }"));
        assert!(pos("{ label: 'got it' }") < pos("cookie-accept"));
        assert!(pos("cookie-accept") < pos("{ label: 'continue' }"));
    }

    #[test]
    fn js_phrases_are_lowercase() {
        // Bodies are lowercased before matching, so the set must be too.
        for phrase in JS_REQUIRED_PHRASES {
            assert_eq!(*phrase, phrase.to_lowercase());
        }
    }

    #[test]
    fn detects_js_required_stub_case_insensitively() {
        let padding = "x".repeat(120);
        let result =
            success_with_body(&format!("Please ENABLE JavaScript to view this site. {padding}"));
        assert!(requires_javascript(&result));
    }

    #[test]
    fn real_article_body_does_not_trigger_heuristic() {
        let result = success_with_body(&"A perfectly ordinary article about gardening. ".repeat(5));
        assert!(!requires_javascript(&result));
    }

    #[test]
    fn missing_body_never_triggers_heuristic() {
        let failure = ExtractionResult::failure(
            "https://example.com",
            "HTTP 500",
            Some(FetchMethod::BrowserNoJs),
            Some(500),
            0,
        );
        assert!(!requires_javascript(&failure));
    }

    #[test]
    fn hybrid_extractor_succeeds_on_article_markup() {
        let para = "The library pass rejects this tiny fixture, but the in-house pass accepts paragraph text of this length.";
        let html = format!("<html><body><p>{para}</p></body></html>");
        let result = extract_from_html(
            "https://example.com/a",
            &html,
            Some(200),
            5,
            FetchMethod::Browser,
        );
        assert!(result.success);
        assert_eq!(result.fetch_method, Some(FetchMethod::Browser));
        assert!(result.body.expect("body").contains("in-house pass"));
    }

    #[test]
    fn hybrid_extractor_fails_on_empty_page() {
        let result = extract_from_html(
            "https://example.com/a",
            "<html><body><p>Almost nothing here.</p></body></html>",
            Some(200),
            5,
            FetchMethod::BrowserNoJs,
        );
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Body too short"));
        assert_eq!(result.status_code, Some(200));
    }
}
