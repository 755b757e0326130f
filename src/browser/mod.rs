//! Headless browser automation
//!
//! The crawler talks to the browser only through [`BrowserLauncher`] and
//! [`BrowserSession`]. One session is one isolated browser context owned by a
//! single crawl job; the job issues one operation at a time against it.

mod chromium;

pub use chromium::ChromiumLauncher;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by browser operations
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Browser session is closed")]
    Closed,
}

/// How long navigation waits before it is considered complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationWait {
    /// Wait for the document to finish loading its DOM
    ContentLoaded,
    /// Return as soon as the navigation is committed
    Committed,
}

impl std::fmt::Display for NavigationWait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationWait::ContentLoaded => write!(f, "content-loaded"),
            NavigationWait::Committed => write!(f, "committed"),
        }
    }
}

/// Starts isolated browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// A single browser context driven by one crawl job
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates to `url`, waiting according to `wait`, bounded by `timeout`
    async fn navigate(
        &mut self,
        url: &Url,
        wait: NavigationWait,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Waits until an element matching `selector` is attached to the DOM
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Current document title, if any
    async fn title(&mut self) -> Result<Option<String>, BrowserError>;

    /// Serialized HTML of the current (possibly script-mutated) DOM
    async fn content(&mut self) -> Result<String, BrowserError>;

    /// URL currently shown, which may differ from the one navigated to
    async fn current_url(&mut self) -> Result<Option<String>, BrowserError>;

    /// Selects `value` in the `<select>` matched by `selector` and fires change events
    async fn select_option(&mut self, selector: &str, value: &str) -> Result<(), BrowserError>;

    /// Releases the context; later calls fail with [`BrowserError::Closed`]
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Runs a browser future under a timeout, mapping expiry to [`BrowserError::Timeout`]
pub async fn with_timeout<F, T>(
    operation: &str,
    after: Duration,
    future: F,
) -> Result<T, BrowserError>
where
    F: std::future::Future<Output = Result<T, BrowserError>>,
{
    match tokio::time::timeout(after, future).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::Timeout {
            operation: operation.to_string(),
            after,
        }),
    }
}
