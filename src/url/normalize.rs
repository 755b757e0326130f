use crate::UrlError;
use url::Url;

/// Normalizes a URL into its crawl-dedup form
///
/// Two URLs normalize equal iff they are the same page for deduplication.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Lowercase the host and drop a leading `www.`
/// 4. Normalize path:
///    - Remove dot segments (. and ..) and repeated slashes
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove fragment and query string
///
/// The scheme is kept as-is (the parser already lowercases it).
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use fathom_crawler::url::normalize_url;
///
/// let url = normalize_url("http://WWW.EXAMPLE.COM/page/?q=1#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?;
    let mut normalized_host = host.to_lowercase();
    if let Some(stripped) = normalized_host.strip_prefix("www.") {
        if stripped.is_empty() {
            return Err(UrlError::MissingDomain);
        }
        normalized_host = stripped.to_string();
    }
    url.set_host(Some(&normalized_host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);
    url.set_query(None);

    Ok(url)
}

/// Normalizes a URL path by removing dot segments, empty segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Prepends `https://` to a seed that was given without a scheme
///
/// Seed lists are frequently written as bare domains (`example.com/about`).
pub fn with_default_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") || trimmed.contains("://")
    {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
