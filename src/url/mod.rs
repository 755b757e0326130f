//! URL handling module for Fathom
//!
//! This module provides URL normalization, site scoping, and filtering of
//! links that point at non-document resources.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, origin_of, site_key};
pub use filter::ResourceFilter;
pub use normalize::{normalize_url, with_default_scheme};

use url::Url;

/// Returns true if `candidate` belongs to the site identified by `site`
///
/// # Arguments
///
/// * `site` - The site key of the seed (see [`site_key`])
/// * `candidate` - The URL to check
///
/// # Examples
///
/// ```
/// use url::Url;
/// use fathom_crawler::url::is_same_site;
///
/// let page = Url::parse("https://www.example.com/about").unwrap();
/// assert!(is_same_site("example.com", &page));
/// ```
pub fn is_same_site(site: &str, candidate: &Url) -> bool {
    site_key(candidate).is_some_and(|key| key == site)
}
