//! Breadth-first frontier and visited set for one crawl job
//!
//! The frontier owns every piece of "have we seen this URL" state for a job:
//! URLs waiting in the queue, URLs already processed, and URLs that were
//! dequeued but deliberately not processed (too deep, disallowed, etc.).
//! A normalized URL can be in at most one of these sets.

use crate::url::{is_same_site, normalize_url, site_key, ResourceFilter};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be crawled, with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// What happened to a URL offered to [`Frontier::enqueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// Could not be parsed or normalized
    Invalid,
    /// Belongs to a different site than the seed
    OffSite,
    /// Points at an image, archive, stylesheet, etc.
    NotDocument,
    /// Deeper than the job's depth limit
    TooDeep,
    /// Already queued, visited, or discarded
    Seen,
}

/// FIFO queue plus visited bookkeeping, scoped to the seed's site
#[derive(Debug)]
pub struct Frontier {
    site: String,
    filter: ResourceFilter,
    max_depth: Option<u32>,
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    discarded: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier scoped to the site of `seed`
    ///
    /// # Arguments
    ///
    /// * `seed` - Normalized seed URL; defines the site
    /// * `filter` - Non-document resource filter
    /// * `max_depth` - Depth limit, `None` for unlimited
    pub fn new(seed: &Url, filter: ResourceFilter, max_depth: Option<u32>) -> Self {
        Self {
            site: site_key(seed).unwrap_or_default(),
            filter,
            max_depth,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            discarded: HashSet::new(),
        }
    }

    /// Normalizes and filters a discovered URL, queueing it if it is new
    pub fn enqueue(&mut self, raw_url: &str, depth: u32) -> EnqueueOutcome {
        let Ok(url) = normalize_url(raw_url) else {
            return EnqueueOutcome::Invalid;
        };

        if !is_same_site(&self.site, &url) {
            return EnqueueOutcome::OffSite;
        }
        if !self.filter.is_document(&url) {
            return EnqueueOutcome::NotDocument;
        }
        if self.is_too_deep(depth) {
            return EnqueueOutcome::TooDeep;
        }

        let key = url.as_str();
        if self.queued.contains(key) || self.visited.contains(key) || self.discarded.contains(key)
        {
            return EnqueueOutcome::Seen;
        }

        self.queued.insert(key.to_string());
        self.queue.push_back(FrontierEntry { url, depth });
        EnqueueOutcome::Queued
    }

    /// Pops the oldest entry
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(entry.url.as_str());
        Some(entry)
    }

    /// Records that a URL is being processed; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Records that a dequeued URL was skipped, so rediscovery ignores it
    pub fn discard(&mut self, url: &Url) {
        self.discarded.insert(url.as_str().to_string());
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// True if `depth` exceeds the job's limit
    pub fn is_too_deep(&self, depth: u32) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }

    pub fn is_document(&self, url: &Url) -> bool {
        self.filter.is_document(url)
    }

    /// Number of distinct URLs processed so far
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn site(&self) -> &str {
        &self.site
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier(max_depth: Option<u32>) -> Frontier {
        let seed = normalize_url("https://www.example.com/").unwrap();
        Frontier::new(&seed, ResourceFilter::new([".pdf", ".png"]), max_depth)
    }

    #[test]
    fn test_fifo_order() {
        let mut f = frontier(None);
        f.enqueue("https://example.com/", 0);
        f.enqueue("https://example.com/a", 1);
        f.enqueue("https://example.com/b", 1);

        let order: Vec<String> = std::iter::from_fn(|| f.dequeue())
            .map(|e| e.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/", "/a", "/b"]);
    }

    #[test]
    fn test_dedups_normalized_variants() {
        let mut f = frontier(None);
        assert_eq!(f.enqueue("https://example.com/a", 1), EnqueueOutcome::Queued);
        assert_eq!(
            f.enqueue("https://www.example.com/a/?q=1#x", 1),
            EnqueueOutcome::Seen
        );
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn test_visited_blocks_requeue() {
        let mut f = frontier(None);
        f.enqueue("https://example.com/a", 1);
        let entry = f.dequeue().unwrap();
        assert!(f.mark_visited(&entry.url));
        assert!(!f.mark_visited(&entry.url));

        assert_eq!(f.enqueue("https://example.com/a", 2), EnqueueOutcome::Seen);
        assert!(f.is_empty());
        assert_eq!(f.visited_len(), 1);
    }

    #[test]
    fn test_discarded_blocks_requeue() {
        let mut f = frontier(None);
        f.enqueue("https://example.com/private", 1);
        let entry = f.dequeue().unwrap();
        f.discard(&entry.url);

        assert_eq!(
            f.enqueue("https://example.com/private", 1),
            EnqueueOutcome::Seen
        );
    }

    #[test]
    fn test_domain_scope() {
        let mut f = frontier(None);
        assert_eq!(f.enqueue("https://other.com/", 1), EnqueueOutcome::OffSite);
        assert_eq!(
            f.enqueue("https://blog.example.com/", 1),
            EnqueueOutcome::OffSite
        );
        assert_eq!(f.enqueue("http://example.com/x", 1), EnqueueOutcome::Queued);
    }

    #[test]
    fn test_resource_filter() {
        let mut f = frontier(None);
        assert_eq!(
            f.enqueue("https://example.com/deck.PDF", 1),
            EnqueueOutcome::NotDocument
        );
        assert_eq!(
            f.enqueue("https://example.com/logo.png", 1),
            EnqueueOutcome::NotDocument
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut f = frontier(Some(1));
        assert_eq!(f.enqueue("https://example.com/a", 1), EnqueueOutcome::Queued);
        assert_eq!(f.enqueue("https://example.com/b", 2), EnqueueOutcome::TooDeep);
        assert!(f.is_too_deep(2));
        assert!(!frontier(None).is_too_deep(1000));
    }

    #[test]
    fn test_invalid_url() {
        let mut f = frontier(None);
        assert_eq!(f.enqueue("not a url", 1), EnqueueOutcome::Invalid);
        assert_eq!(f.enqueue("ftp://example.com/", 1), EnqueueOutcome::Invalid);
    }
}
