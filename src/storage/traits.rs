//! Storage traits and error types
//!
//! This module defines the seam between the crawler and whatever persists its
//! artifacts. A [`ContentStore`] hands out one [`SiteWriter`] per crawl job;
//! the writer is owned by that job alone.

use crate::crawler::{BatchResult, CrawlSummary};
use crate::storage::PageRecord;
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid output location: {0}")]
    InvalidLocation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Factory for per-site writers plus the batch-level artifact
pub trait ContentStore: Send + Sync {
    /// Prepares the output location for one seed URL
    ///
    /// # Arguments
    ///
    /// * `seed` - The normalized seed URL of the job
    ///
    /// # Returns
    ///
    /// A writer that persists every artifact of that job
    fn open_site(&self, seed: &Url) -> StorageResult<Box<dyn SiteWriter>>;

    /// Persists the aggregate batch result, returning its location
    fn write_batch(&self, batch: &BatchResult) -> StorageResult<String>;
}

/// Writes the artifacts of a single crawl job
///
/// Each page is written as soon as it is crawled; nothing is buffered.
pub trait SiteWriter: Send {
    /// Human-readable location of this site's output (e.g. a directory path)
    fn location(&self) -> String;

    /// Persists one page, returning the artifact name it was stored under
    fn write_page(&mut self, page: &PageRecord) -> StorageResult<String>;

    /// Persists the end-of-job summary, returning its location
    fn write_summary(&mut self, summary: &CrawlSummary) -> StorageResult<String>;
}
