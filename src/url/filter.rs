use url::Url;

/// Filter for URLs that point at non-document resources
///
/// Matching is a case-insensitive suffix check against the URL path, so
/// `/logo.PNG` is skipped but `/png-guide` is not.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    extensions: Vec<String>,
}

impl ResourceFilter {
    /// Creates a filter from a list of extensions (with or without the leading dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .filter(|ext| ext.len() > 1)
            .collect();

        Self { extensions }
    }

    /// Returns true if the URL looks like an HTML document worth rendering
    pub fn is_document(&self, url: &Url) -> bool {
        let path = url.path().to_lowercase();
        !self.extensions.iter().any(|ext| path.ends_with(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ResourceFilter {
        ResourceFilter::new([".pdf", "png", ".CSS"])
    }

    #[test]
    fn test_skips_listed_extensions() {
        let f = filter();
        assert!(!f.is_document(&Url::parse("https://a.com/report.pdf").unwrap()));
        assert!(!f.is_document(&Url::parse("https://a.com/img/logo.PNG").unwrap()));
        assert!(!f.is_document(&Url::parse("https://a.com/site.css").unwrap()));
    }

    #[test]
    fn test_keeps_documents() {
        let f = filter();
        assert!(f.is_document(&Url::parse("https://a.com/").unwrap()));
        assert!(f.is_document(&Url::parse("https://a.com/png-guide").unwrap()));
        assert!(f.is_document(&Url::parse("https://a.com/about.html").unwrap()));
    }

    #[test]
    fn test_query_does_not_hide_extension() {
        let f = filter();
        assert!(!f.is_document(&Url::parse("https://a.com/file.pdf?dl=1").unwrap()));
    }
}
