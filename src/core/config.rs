//! Environment knobs for the fetch tiers.
//!
//! Every deadline defaults to the pipeline's documented value and can be
//! overridden per-process for isolated testing. Values are read on every
//! call; none of them is worth caching.

pub const ENV_HTTP_TIMEOUT_SECS: &str = "PAGESIEVE_HTTP_TIMEOUT_SECS";
pub const ENV_LIBRARY_TIMEOUT_SECS: &str = "PAGESIEVE_LIBRARY_TIMEOUT_SECS";
pub const ENV_NAVIGATION_TIMEOUT_SECS: &str = "PAGESIEVE_NAVIGATION_TIMEOUT_SECS";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LIBRARY_TIMEOUT_SECS: u64 = 15;
const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

fn env_secs(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(default)
}

/// Whole-request deadline of the plain HTTP tier.
pub fn http_timeout_secs() -> u64 {
    env_secs(ENV_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS)
}

/// Overall deadline of the article-library tier (download + extraction).
pub fn library_timeout_secs() -> u64 {
    env_secs(ENV_LIBRARY_TIMEOUT_SECS, DEFAULT_LIBRARY_TIMEOUT_SECS)
}

/// Browser navigation deadline; settle waits come on top of this.
pub fn navigation_timeout_secs() -> u64 {
    env_secs(ENV_NAVIGATION_TIMEOUT_SECS, DEFAULT_NAVIGATION_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tier_deadlines() {
        assert_eq!(env_secs("PAGESIEVE_TEST_UNSET_KEY", 10), 10);
        assert_eq!(http_timeout_secs(), 10);
        assert_eq!(library_timeout_secs(), 15);
        assert_eq!(navigation_timeout_secs(), 30);
    }
}
