//! HTML parser for extracting links, titles and form controls
//!
//! This module handles parsing rendered HTML to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title
//! - `<select>` controls and their options for dynamic exploration

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page (absolute URLs, document order)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use fathom_crawler::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page"]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}

/// One `<option>` of a select control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// A `<select>` element found in the rendered DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectControl {
    pub id: Option<String>,
    pub name: Option<String>,
    /// 1-based position among sibling `<select>` elements
    pub position: usize,
    /// Options worth exercising, placeholders removed
    pub options: Vec<SelectOption>,
}

impl SelectControl {
    /// Builds a selector for this control: by id, then name, then position
    pub fn selector(&self) -> String {
        if let Some(id) = self.id.as_deref() {
            if is_css_identifier(id) {
                return format!("select#{}", id);
            }
            return format!("select[id=\"{}\"]", escape_attr(id));
        }

        if let Some(name) = self.name.as_deref() {
            return format!("select[name=\"{}\"]", escape_attr(name));
        }

        format!("select:nth-of-type({})", self.position)
    }
}

fn is_css_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Returns true if an option value is empty or one of the placeholder values
///
/// Placeholders are compared case-insensitively, so `Select` and `SELECT`
/// both match a configured `select`.
pub fn is_placeholder_value(value: &str, placeholders: &[String]) -> bool {
    let value = value.trim();
    value.is_empty()
        || placeholders
            .iter()
            .any(|placeholder| placeholder.eq_ignore_ascii_case(value))
}

/// Finds every `<select>` control that has at least one real option
///
/// # Arguments
///
/// * `html` - Rendered HTML of the page
/// * `placeholders` - Option values that mean "nothing chosen"
pub fn find_select_controls(html: &str, placeholders: &[String]) -> Vec<SelectControl> {
    let document = Html::parse_document(html);
    let (Ok(select_selector), Ok(option_selector)) =
        (Selector::parse("select"), Selector::parse("option"))
    else {
        return Vec::new();
    };

    let mut controls = Vec::new();
    for select in document.select(&select_selector) {
        let options: Vec<SelectOption> = select
            .select(&option_selector)
            .map(|option| {
                let text = option.text().collect::<String>().trim().to_string();
                let value = option
                    .value()
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| text.clone());
                SelectOption { value, text }
            })
            .filter(|option| !is_placeholder_value(&option.value, placeholders))
            .collect();

        if options.is_empty() {
            continue;
        }

        controls.push(SelectControl {
            id: non_empty_attr(&select, "id"),
            name: non_empty_attr(&select, "name"),
            position: sibling_position(&select),
            options,
        });
    }

    controls
}

fn non_empty_attr(element: &ElementRef, attr: &str) -> Option<String> {
    element
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn sibling_position(element: &ElementRef) -> usize {
    element
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|sibling| sibling.value().name() == "select")
        .count()
        + 1
}
