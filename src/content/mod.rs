//! Heuristic HTML-to-text extraction.
//!
//! A deliberately simple pipeline: strip everything that looks like page
//! chrome, then collect the text of paragraph-like elements in document
//! order. It is the in-house counterpart to the readability pass used by
//! the browser tiers: cruder, but predictable and fast.

pub mod classifiers;

use classifiers::{
    CONTENT_TAGS, MIN_BLOCK_LENGTH, MIN_BODY_LENGTH, NOISE_CLASSES, NOISE_IDS, NOISE_ROLES,
    NOISE_TAGS,
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Parse an HTML string into a document tree. The parser is lenient: broken
/// markup produces a best-effort tree, never an error.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Parse raw response bytes, decoding as UTF-8 with replacement characters
/// for invalid sequences.
pub fn parse_document_bytes(raw: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(raw))
}

/// Pull the best title from a document.
///
/// Priority: `og:title` meta → `<title>` (with site-name suffix cleaning)
/// → first `<h1>`.
pub fn extract_title(document: &Html) -> Option<String> {
    if let Ok(selector) = Selector::parse("meta[property=\"og:title\"]") {
        for element in document.select(&selector) {
            if let Some(content) = element.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("title") {
        if let Some(element) = document.select(&selector).next() {
            let raw = element.text().collect::<String>().trim().to_string();
            if !raw.is_empty() {
                return Some(clean_title_suffix(&raw));
            }
        }
    }

    if let Ok(selector) = Selector::parse("h1") {
        if let Some(element) = document.select(&selector).next() {
            let combined = element
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !combined.is_empty() {
                return Some(combined);
            }
        }
    }

    None
}

/// Strip a trailing `" | SiteName"` / `" - SiteName"` style suffix. When
/// cleaning would leave nothing, the original wins.
fn clean_title_suffix(title: &str) -> String {
    let Ok(suffix) = Regex::new(r"\s*[|\-–—]\s*[^|\-–—]+$") else {
        return title.to_string();
    };
    let cleaned = suffix.replace(title, "");
    if cleaned.trim().is_empty() {
        title.to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Pull clean body text from a document: drop noise subtrees, collect the
/// text of content elements, filter out stub blocks, join with blank lines.
///
/// Returns `None` when the surviving text is under [`MIN_BODY_LENGTH`]
/// characters. Nested content elements (a `blockquote` holding a `<p>`)
/// contribute overlapping text; no dedup is attempted.
pub fn extract_text_content(document: &mut Html) -> Option<String> {
    remove_noise(document);

    let blocks = collect_blocks(document);
    let body = blocks
        .into_iter()
        .filter(|block| block.chars().count() >= MIN_BLOCK_LENGTH)
        .collect::<Vec<_>>()
        .join("\n\n");

    if body.chars().count() < MIN_BODY_LENGTH {
        None
    } else {
        Some(body)
    }
}

/// Detach every element matching a noise rule, descendants included.
/// Matches are collected before any detach; mutating the tree mid-walk
/// would skip siblings of removed nodes.
fn remove_noise(document: &mut Html) {
    let mut doomed = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if is_noise_element(&element) {
            doomed.push(node.id());
        }
    }

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn is_noise_element(element: &ElementRef) -> bool {
    let value = element.value();
    if NOISE_TAGS.contains(&value.name()) {
        return true;
    }
    if let Some(class) = value.attr("class") {
        for token in class.split_whitespace() {
            if NOISE_CLASSES.contains(&token.to_ascii_lowercase().as_str()) {
                return true;
            }
        }
    }
    if let Some(id) = value.attr("id") {
        if NOISE_IDS.contains(&id.to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    if let Some(role) = value.attr("role") {
        if NOISE_ROLES.contains(&role.to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    false
}

/// Gather the whitespace-collapsed text of every content element still
/// attached to the tree, in document order. Link text inside a block is
/// part of the block.
fn collect_blocks(document: &Html) -> Vec<String> {
    let mut blocks = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if !CONTENT_TAGS.contains(&element.value().name()) {
            continue;
        }
        let text = collapse_whitespace(&element.text().collect::<String>());
        if !text.is_empty() {
            blocks.push(text);
        }
    }
    blocks
}

/// Collapse every whitespace run to a single space and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
