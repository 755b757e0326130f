use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use fathom_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the key used to decide whether two URLs belong to the same site
///
/// The key is the host without a leading `www.`, plus the port when one is
/// given explicitly. `www.example.com` and `example.com` share a key;
/// `blog.example.com` does not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use fathom_crawler::url::site_key;
///
/// let a = Url::parse("https://www.example.com/a").unwrap();
/// let b = Url::parse("https://example.com/b").unwrap();
/// assert_eq!(site_key(&a), site_key(&b));
/// ```
pub fn site_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns the robots.txt origin (`scheme://host[:port]`) of a URL
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
