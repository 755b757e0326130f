//! Job inputs and result records shared by the crawl controller, the batch
//! manager and the output layer

use crate::config::CrawlerConfig;
use crate::state::TerminationReason;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

/// One crawl rooted at a single seed URL
///
/// A limit of `0` (or `None` for the time budget) means unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub seed_url: String,
    pub max_depth: u32,
    pub max_pages: u32,
    pub max_time: Option<Duration>,
}

impl CrawlJob {
    /// Creates a job with the default limits
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self::from_config(seed_url, &CrawlerConfig::default())
    }

    /// Creates a job whose limits come from the `[crawler]` section
    pub fn from_config(seed_url: impl Into<String>, config: &CrawlerConfig) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            max_time: config.time_limit(),
        }
    }

    pub fn depth_limit(&self) -> Option<u32> {
        (self.max_depth > 0).then_some(self.max_depth)
    }

    pub fn page_limit(&self) -> Option<usize> {
        (self.max_pages > 0).then_some(self.max_pages as usize)
    }
}

/// One entry of a site's crawled-page list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawledPage {
    pub url: String,
    pub title: String,
    /// Link distance from the seed
    pub depth: u32,
    /// Number of dropdown states captured on this page
    pub dynamic_states: usize,
    /// Name of the page's text artifact
    pub artifact: String,
}

/// Final statistics for one site crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed_url: String,
    pub finished_at: DateTime<Local>,
    pub pages_crawled: usize,
    pub unique_urls: usize,
    pub elapsed_seconds: f64,
    pub disallowed_count: usize,
    pub failed_count: usize,
    pub termination: TerminationReason,
    pub output_location: String,
    pub crawled_pages: Vec<CrawledPage>,
}

impl CrawlSummary {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_seconds / 60.0
    }
}

/// Outcome of one seed within a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_crawled: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    pub fn succeeded(url: &str, output_location: String, pages: usize, elapsed: Duration) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            output_location: Some(output_location),
            pages_crawled: Some(pages),
            elapsed_seconds: Some(elapsed.as_secs_f64()),
            error: None,
        }
    }

    pub fn failed(url: &str, error: &str) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            output_location: None,
            pages_crawled: None,
            elapsed_seconds: None,
            error: Some(error.to_string()),
        }
    }
}

/// Per-seed results of a batch, in seed order
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub results: Vec<JobResult>,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.succeeded_count()
    }

    /// Total pages crawled across successful jobs
    pub fn total_pages(&self) -> usize {
        self.results.iter().filter_map(|r| r.pages_crawled).sum()
    }
}
