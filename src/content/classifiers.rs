//! Noise and content classifiers for the heuristic extractor.
//!
//! Kept as plain data so the rules stay auditable. Matching contracts:
//! tag names as the parser reports them (lowercase for HTML elements),
//! `class` compared token-by-token after ASCII lowercasing, `id` and `role`
//! compared whole after ASCII lowercasing.

/// Tags whose entire subtree is dropped before text collection.
pub const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "aside", "header", "noscript", "iframe", "form", "svg",
    "button", "select", "option", "textarea", "input", "label", "fieldset", "legend", "dialog",
    "menu", "menuitem", "details", "summary",
];

/// Class tokens that mark an element as page chrome rather than article.
pub const NOISE_CLASSES: &[&str] = &[
    "ad",
    "ads",
    "advert",
    "advertisement",
    "banner",
    "sponsor",
    "sponsored",
    "promo",
    "promotion",
    "sidebar",
    "widget",
    "social",
    "share",
    "sharing",
    "cookie",
    "consent",
    "popup",
    "modal",
    "overlay",
    "newsletter",
    "subscribe",
    "signup",
    "sign-up",
    "cta",
    "call-to-action",
    "related",
    "recommended",
    "trending",
    "popular",
    "breadcrumb",
    "pagination",
    "pager",
    "toolbar",
    "tooltip",
    "dropdown",
    "comment",
    "comments",
    "disqus",
];

/// Element ids that mark chrome.
pub const NOISE_IDS: &[&str] = &[
    "ad",
    "ads",
    "sidebar",
    "cookie-banner",
    "newsletter",
    "comments",
    "disqus_thread",
    "social-share",
];

/// ARIA roles that mark chrome.
pub const NOISE_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "complementary",
    "contentinfo",
    "form",
    "search",
    "menu",
    "menubar",
];

/// Tags whose text is collected as candidate article blocks.
pub const CONTENT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "td", "th", "figcaption", "pre",
    "dd",
];

/// Blocks shorter than this are discarded as stray labels or captions.
pub const MIN_BLOCK_LENGTH: usize = 15;

/// Bodies shorter than this count as "no extractable content".
pub const MIN_BODY_LENGTH: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_entries_are_normalized() {
        for set in [NOISE_TAGS, NOISE_CLASSES, NOISE_IDS, NOISE_ROLES, CONTENT_TAGS] {
            for entry in set {
                assert_eq!(*entry, entry.to_ascii_lowercase(), "entry not lowercase");
                assert!(!entry.contains(' '), "entry contains whitespace");
            }
        }
    }

    #[test]
    fn content_and_noise_tags_do_not_overlap() {
        for tag in CONTENT_TAGS {
            assert!(!NOISE_TAGS.contains(tag), "{tag} is both content and noise");
        }
    }
}
