//! Page fetch and render driver
//!
//! This module drives a browser session to a URL and waits for the page to
//! become readable:
//! - Strict navigation first, lenient retry on failure
//! - Best-effort readiness waits for the body and a content region
//! - Politeness pause before the DOM is read

use crate::browser::{BrowserError, BrowserSession, NavigationWait};
use crate::config::Config;
use crate::crawler::parser::parse_html;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Timeouts and selectors used while loading a page
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub navigation_timeout: Duration,
    pub fallback_timeout: Duration,
    pub readiness_timeout: Duration,
    pub readiness_selector: String,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            navigation_timeout: config.browser.navigation_timeout(),
            fallback_timeout: config.browser.fallback_navigation_timeout(),
            readiness_timeout: config.browser.readiness_timeout(),
            readiness_selector: config.extraction.readiness_selector.clone(),
        }
    }
}

/// A page after navigation and readiness waits
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL that was requested
    pub url: Url,
    /// Where the browser ended up, when it differs from `url`
    pub final_url: Option<String>,
    pub title: String,
    pub html: String,
}

/// Navigates to `url` and returns the rendered DOM
///
/// # Navigation Strategy
///
/// | Attempt | Wait | Timeout |
/// |---------|------|---------|
/// | 1 | content loaded | `navigation_timeout` |
/// | 2 | committed | `fallback_timeout` |
///
/// After navigation the driver waits for `body` and then for the readiness
/// selector; a miss on either is logged and ignored. It then sleeps for
/// `crawl_delay` before reading the DOM.
///
/// # Returns
///
/// * `Ok(RenderedPage)` - The page was loaded (possibly partially)
/// * `Err(BrowserError)` - Both navigation attempts failed, or the DOM could not be read
pub async fn fetch_and_render(
    session: &mut dyn BrowserSession,
    url: &Url,
    settings: &FetchSettings,
    crawl_delay: Duration,
) -> Result<RenderedPage, BrowserError> {
    if let Err(e) = session
        .navigate(url, NavigationWait::ContentLoaded, settings.navigation_timeout)
        .await
    {
        warn!("Navigation to {} failed ({}), retrying with lenient wait", url, e);
        session
            .navigate(url, NavigationWait::Committed, settings.fallback_timeout)
            .await?;
    }

    if let Err(e) = session
        .wait_for_selector("body", settings.readiness_timeout)
        .await
    {
        debug!("Body not ready on {}: {}", url, e);
    }

    if let Err(e) = session
        .wait_for_selector(&settings.readiness_selector, settings.readiness_timeout)
        .await
    {
        debug!("No content region attached on {}: {}", url, e);
    }

    if !crawl_delay.is_zero() {
        tokio::time::sleep(crawl_delay).await;
    }

    let html = session.content().await?;

    let title = match session.title().await {
        Ok(Some(title)) if !title.trim().is_empty() => title.trim().to_string(),
        _ => parse_html(&html, url).title.unwrap_or_default(),
    };

    let final_url = session
        .current_url()
        .await
        .ok()
        .flatten()
        .filter(|current| current != url.as_str());

    Ok(RenderedPage {
        url: url.clone(),
        final_url,
        title,
        html,
    })
}
