//! Main-content extraction from rendered HTML
//!
//! Text is collected the way a browser's `innerText` would present it: block
//! elements start new lines, hidden and script elements contribute nothing,
//! and runs of whitespace collapse to one space.

use crate::config::ExtractionConfig;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Returned when the document has no renderable body (non-HTML resources)
pub const NON_HTML_CONTENT: &str =
    "[No text content available - this may be a non-HTML file]";

/// Returned when the body exists but contains no text
pub const EMPTY_CONTENT: &str = "[No text content available]";

const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "svg", "canvas", "iframe", "object",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "summary",
    "table", "tr", "ul",
];

/// Returns the best-effort main content of a rendered page
///
/// Tries each configured content selector in order and takes the first
/// matching element whose text is longer than `min_content_length`
/// characters. Falls back to the whole body, then to a sentinel.
///
/// # Arguments
///
/// * `html` - Rendered HTML of the page
/// * `config` - Selector list and length threshold
pub fn extract_base_content(html: &str, config: &ExtractionConfig) -> String {
    if html.trim().is_empty() {
        return NON_HTML_CONTENT.to_string();
    }

    let document = Html::parse_document(html);

    for raw in &config.content_selectors {
        let selector = match Selector::parse(raw) {
            Ok(selector) => selector,
            Err(e) => {
                debug!("Skipping invalid content selector '{}': {:?}", raw, e);
                continue;
            }
        };

        if let Some(element) = document.select(&selector).next() {
            let text = element_text(element);
            if text.chars().count() > config.min_content_length {
                debug!("Using content region '{}'", raw);
                return text;
            }
        }
    }

    let Some(body) = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
    else {
        return NON_HTML_CONTENT.to_string();
    };

    let text = element_text(body);
    if text.is_empty() {
        EMPTY_CONTENT.to_string()
    } else {
        text
    }
}

/// Visible text of an element, one line per block
pub fn element_text(element: ElementRef) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) || el.attr("hidden").is_some() {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_element, out);
                if block {
                    out.push('\n');
                } else if matches!(name, "td" | "th") {
                    out.push('\t');
                }
            }
            _ => {}
        }
    }
}

fn normalize_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
