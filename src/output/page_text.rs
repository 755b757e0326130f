//! Plain-text page artifacts
//!
//! One artifact per crawled page, read later by the summarization stage.

use crate::storage::PageRecord;
use url::Url;

const HEAVY_RULE_WIDTH: usize = 80;

/// Formats a page record as the text artifact
///
/// ```text
/// URL: <url>
/// TITLE: <title>
///
/// BASE CONTENT:
/// ========...
/// <text>
///
/// DYNAMIC CONTENT:
/// ========...
/// [1] SELECT: <label>
/// --------...
/// <text>
/// ```
///
/// The dynamic section is omitted when the page has no dynamic states.
pub fn format_page_text(page: &PageRecord) -> String {
    let heavy = "=".repeat(HEAVY_RULE_WIDTH);
    let light = "-".repeat(HEAVY_RULE_WIDTH);
    let mut text = String::new();

    text.push_str(&format!("URL: {}\n", page.url));
    text.push_str(&format!("TITLE: {}\n\n", page.title));
    text.push_str("BASE CONTENT:\n");
    text.push_str(&heavy);
    text.push('\n');
    text.push_str(&page.base_content);
    text.push_str("\n\n");

    if !page.dynamic_states.is_empty() {
        text.push_str("DYNAMIC CONTENT:\n");
        text.push_str(&heavy);
        text.push('\n');

        for (i, state) in page.dynamic_states.iter().enumerate() {
            text.push_str(&format!(
                "[{}] {}: {}\n",
                i + 1,
                state.element_type.heading(),
                state.label()
            ));
            text.push_str(&light);
            text.push('\n');
            text.push_str(&state.content);
            text.push_str("\n\n");
        }
    }

    text
}

/// Derives the artifact base name (without extension) from a page URL
///
/// The path is stripped of surrounding slashes, inner slashes become `_`, and
/// anything outside `[A-Za-z0-9_-]` is dropped. The root page is `index`; a
/// path that sanitizes to nothing is `page`.
pub fn artifact_stem(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() || path == "/" {
        return "index".to_string();
    }

    let stem: String = path
        .trim_matches('/')
        .replace('/', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if stem.is_empty() {
        "page".to_string()
    } else {
        stem
    }
}
