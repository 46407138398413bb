//! Regex-based extraction helpers for server-rendered HTML fragments.
//!
//! The target application's markup is machine-generated and flat, which
//! keeps pattern-based extraction dependable; there is no general-purpose
//! HTML parsing here.

use std::sync::LazyLock;

use regex_lite::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("TAG_RE should compile"));
static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("MULTI_SPACE should compile"));

// Tags the generated markup nests text in; keeps the per-call patterns
// free of backreferences.
const TEXT_TAGS: [&str; 5] = ["td", "span", "div", "p", "a"];

/// Extracts one attribute value from a tag's attribute list.
pub(crate) fn attribute(attrs: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"(?i)\b{}\s*=\s*["']([^"']*)["']"#, regex_lite::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(attrs)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strips tags, decodes entities, and collapses whitespace.
pub(crate) fn clean_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, " ");
    let decoded = decode_entities(&stripped);
    MULTI_SPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Decode the handful of HTML entities the generated tables use.
pub(crate) fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

/// Attribute list and inner HTML of the element with the given id.
pub(crate) fn element_by_id(html: &str, id: &str) -> Option<(String, String)> {
    for tag in TEXT_TAGS {
        let pattern = format!(
            r#"(?is)<{tag}([^>]*\bid=["']{id}["'][^>]*)>(.*?)</{tag}>"#,
            tag = tag,
            id = regex_lite::escape(id)
        );
        if let Ok(re) = Regex::new(&pattern) {
            if let Some(caps) = re.captures(html) {
                let attrs = caps.get(1).map(|m| m.as_str().to_string())?;
                let inner = caps.get(2).map(|m| m.as_str().to_string())?;
                return Some((attrs, inner));
            }
        }
    }
    None
}

/// Text content of the element with the given id, wherever it sits in the
/// document (footer cells like the task total live outside the rows).
pub(crate) fn element_text_by_id(html: &str, id: &str) -> Option<String> {
    element_by_id(html, id).map(|(_, inner)| clean_text(&inner))
}

/// Text content of the first element carrying the given class.
pub(crate) fn element_text_by_class(html: &str, class: &str) -> Option<String> {
    element_html_by_class(html, class).map(|inner| clean_text(&inner))
}

/// Raw inner HTML of the first element carrying the given class.
pub(crate) fn element_html_by_class(html: &str, class: &str) -> Option<String> {
    for tag in TEXT_TAGS {
        let pattern = format!(
            r#"(?is)<{tag}[^>]*class=["'][^"']*\b{class}\b[^"']*["'][^>]*>(.*?)</{tag}>"#,
            tag = tag,
            class = regex_lite::escape(class)
        );
        if let Ok(re) = Regex::new(&pattern) {
            if let Some(caps) = re.captures(html) {
                return caps.get(1).map(|m| m.as_str().to_string());
            }
        }
    }
    None
}
