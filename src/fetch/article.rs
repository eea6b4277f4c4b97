use crate::content::classifiers::MIN_BODY_LENGTH;
use crate::core::config;
use crate::core::error::FetchError;
use crate::core::result::{ExtractionResult, FetchMethod};
use crate::fetch::elapsed_ms;
use readability::extractor;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

/// Fixed-size pool for the synchronous readability runs. Work beyond the
/// pool size queues on the semaphore instead of piling blocking threads.
const LIBRARY_WORKERS: usize = 4;
static WORKER_SLOTS: Semaphore = Semaphore::const_new(LIBRARY_WORKERS);

/// Tier 2: hand the URL to the readability crate, which downloads and
/// extracts in one synchronous pass.
///
/// Readability applies its own content scoring, so it frequently succeeds
/// where the tier-1 heuristics came up short. The whole operation runs
/// under one deadline; a timed-out worker is abandoned, not interrupted.
pub async fn fetch_article(url: &str) -> ExtractionResult {
    let start = Instant::now();
    debug!(url, "tier 2: readability fetch");

    let deadline = Duration::from_secs(config::library_timeout_secs());
    let outcome = tokio::time::timeout(deadline, scrape_on_worker(url)).await;
    let elapsed = elapsed_ms(start);

    let product = match outcome {
        Err(_) => {
            return ExtractionResult::failure(
                url,
                FetchError::LibraryTimeout.to_string(),
                Some(FetchMethod::Library),
                None,
                elapsed,
            );
        }
        Ok(Err(err)) => {
            return ExtractionResult::failure(
                url,
                err.to_string(),
                Some(FetchMethod::Library),
                None,
                elapsed,
            );
        }
        Ok(Ok(product)) => product,
    };

    let body = product.text;
    if body.chars().count() < MIN_BODY_LENGTH {
        return ExtractionResult::failure(
            url,
            FetchError::LibraryExtraction.to_string(),
            Some(FetchMethod::Library),
            None,
            elapsed,
        );
    }

    let title = Some(product.title.trim().to_string()).filter(|t| !t.is_empty());
    ExtractionResult::success(url, title, body, FetchMethod::Library, None, elapsed)
}

async fn scrape_on_worker(url: &str) -> Result<extractor::Product, FetchError> {
    let _slot = WORKER_SLOTS
        .acquire()
        .await
        .map_err(|_| FetchError::Library("worker pool closed".to_string()))?;

    let url = url.to_string();
    tokio::task::spawn_blocking(move || extractor::scrape(&url))
        .await
        .map_err(|err| FetchError::Library(format!("worker failed: {err}")))?
        .map_err(|err| FetchError::Library(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_pool_has_four_slots() {
        assert_eq!(WORKER_SLOTS.available_permits(), LIBRARY_WORKERS);
    }
}
