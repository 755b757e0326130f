//! In-memory browser fixture shared by the integration tests
//!
//! `FixtureLauncher` hands out sessions that serve pages from a fixed map
//! instead of driving a real browser. Selecting an option can swap the DOM for
//! a registered variant, which is how dropdown-revealed content is modelled.

#![allow(dead_code)]

use async_trait::async_trait;
use fathom_crawler::browser::{BrowserError, BrowserLauncher, BrowserSession, NavigationWait};
use fathom_crawler::robots::{RobotsPolicy, RobotsResolver};
use fathom_crawler::storage::FsStore;
use fathom_crawler::{normalize_url, Config, CrawlerEngine};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const FIXTURE_ORIGIN: &str = "https://fixture.test";

fn key(url: &str) -> String {
    normalize_url(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Pages served by the fixture, keyed by normalized URL
#[derive(Debug, Clone, Default)]
pub struct FixtureSite {
    pages: HashMap<String, String>,
    variants: HashMap<(String, String, String), String>,
    redirects: HashMap<String, String>,
    failing_options: HashSet<String>,
    navigating_options: HashMap<String, String>,
    disconnecting_options: HashSet<String>,
}

impl FixtureSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(key(url), html.into());
        self
    }

    /// DOM shown on `url` after selecting `value` in the control matched by `selector`
    pub fn variant(mut self, url: &str, selector: &str, value: &str, html: impl Into<String>) -> Self {
        self.variants.insert(
            (key(url), selector.to_string(), value.to_string()),
            html.into(),
        );
        self
    }

    /// Navigating to `from` lands on `to`, which is reported verbatim as the current URL
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(key(from), to.to_string());
        self
    }

    /// Selecting `value` in any control fails
    pub fn failing_option(mut self, value: &str) -> Self {
        self.failing_options.insert(value.to_string());
        self
    }

    /// Selecting `value` in any control navigates the tab to `target`
    pub fn navigating_option(mut self, value: &str, target: &str) -> Self {
        self.navigating_options
            .insert(value.to_string(), target.to_string());
        self
    }

    /// Selecting `value` navigates away and leaves the browser unable to load anything
    pub fn disconnecting_option(mut self, value: &str) -> Self {
        self.disconnecting_options.insert(value.to_string());
        self
    }
}

/// Counters observed across every session of a launcher
#[derive(Debug, Default)]
pub struct FixtureStats {
    pub launches: AtomicUsize,
    pub open: AtomicUsize,
    pub peak: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl FixtureStats {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

pub struct FixtureLauncher {
    site: Arc<FixtureSite>,
    latency: Duration,
    fail_launch: bool,
    panic_on: Option<String>,
    pub stats: Arc<FixtureStats>,
}

impl FixtureLauncher {
    pub fn new(site: FixtureSite) -> Self {
        Self {
            site: Arc::new(site),
            latency: Duration::ZERO,
            fail_launch: false,
            panic_on: None,
            stats: Arc::new(FixtureStats::default()),
        }
    }

    /// Delay added to every navigation
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Every launch fails
    pub fn failing(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Navigating to any URL containing `needle` panics
    pub fn panic_on(mut self, needle: &str) -> Self {
        self.panic_on = Some(needle.to_string());
        self
    }

    pub fn stats(&self) -> Arc<FixtureStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl BrowserLauncher for FixtureLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("fixture launch failure".to_string()));
        }

        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        let open = self.stats.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.peak.fetch_max(open, Ordering::SeqCst);

        Ok(Box::new(FixtureSession {
            site: Arc::clone(&self.site),
            latency: self.latency,
            panic_on: self.panic_on.clone(),
            stats: Arc::clone(&self.stats),
            current: None,
            html: String::new(),
            released: false,
            offline: false,
        }))
    }
}

pub struct FixtureSession {
    site: Arc<FixtureSite>,
    latency: Duration,
    panic_on: Option<String>,
    stats: Arc<FixtureStats>,
    current: Option<String>,
    html: String,
    released: bool,
    offline: bool,
}

impl FixtureSession {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.open.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.released {
            Err(BrowserError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Drop for FixtureSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate(
        &mut self,
        url: &Url,
        _wait: NavigationWait,
        _timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.stats
            .navigations
            .lock()
            .unwrap()
            .push(url.to_string());

        if let Some(needle) = &self.panic_on {
            if url.as_str().contains(needle.as_str()) {
                panic!("fixture panic while loading {}", url);
            }
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.offline {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_INTERNET_DISCONNECTED".to_string(),
            });
        }

        let requested = key(url.as_str());
        let landed = self
            .site
            .redirects
            .get(&requested)
            .cloned()
            .unwrap_or(requested);
        match self.site.pages.get(&key(&landed)) {
            Some(html) => {
                self.html = html.clone();
                self.current = Some(landed);
                Ok(())
            }
            None => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.ensure_open()?;
        if self.current.is_some() {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(selector.to_string()))
        }
    }

    async fn title(&mut self) -> Result<Option<String>, BrowserError> {
        self.ensure_open()?;
        Ok(None)
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.ensure_open()?;
        Ok(self.html.clone())
    }

    async fn current_url(&mut self) -> Result<Option<String>, BrowserError> {
        self.ensure_open()?;
        Ok(self.current.clone())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let Some(current) = self.current.clone() else {
            return Err(BrowserError::ElementNotFound(selector.to_string()));
        };

        if self.site.failing_options.contains(value) {
            return Err(BrowserError::Script(format!(
                "option '{}' of {} is detached",
                value, selector
            )));
        }

        if let Some(target) = self.site.navigating_options.get(value) {
            self.html = self.site.pages.get(&key(target)).cloned().unwrap_or_default();
            self.current = Some(target.clone());
            return Ok(());
        }

        if self.site.disconnecting_options.contains(value) {
            self.offline = true;
            self.html = String::new();
            self.current = Some("chrome-error://chromewebdata/".to_string());
            return Ok(());
        }

        if let Some(html) = self
            .site
            .variants
            .get(&(key(&current), selector.to_string(), value.to_string()))
        {
            self.html = html.clone();
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.release();
        Ok(())
    }
}

/// Builds an HTML page whose main region holds some filler text and the given links
pub fn page_with_links(title: &str, links: &[&str]) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<html><head><title>{}</title></head><body><nav>Menu</nav><main>",
        title
    ));
    html.push_str(&format!(
        "<h1>{}</h1><p>This is the {} page of the fixture site. It has enough text in its main \
         region to count as real content for extraction.</p>",
        title, title
    ));
    for link in links {
        html.push_str(&format!("<a href=\"{}\">{}</a> ", link, link));
    }
    html.push_str("</main></body></html>");
    html
}

/// Settings suitable for tests: no politeness delays, output under `output`
pub fn test_config(output: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.default_crawl_delay_ms = 0;
    config.crawler.max_depth = 0;
    config.crawler.max_pages = 0;
    config.crawler.time_limit_minutes = 0;
    config.crawler.robots_timeout_ms = 2000;
    config.output.directory = output.to_path_buf();
    config
}

/// Builds an engine around a fixture launcher, with permissive robots.txt
/// policies preloaded for `origins`
pub fn engine_for(config: Config, launcher: FixtureLauncher, origins: &[&str]) -> Arc<CrawlerEngine> {
    let robots = RobotsResolver::new(&config).unwrap();
    for origin in origins {
        robots.preload(RobotsPolicy::permissive(
            *origin,
            robots.agent().to_string(),
            Duration::ZERO,
        ));
    }

    let store = FsStore::new(
        config.output.directory.clone(),
        config.output.batch_summary_file.clone(),
    );

    Arc::new(CrawlerEngine::with_components(
        config,
        robots,
        Arc::new(launcher),
        Arc::new(store),
    ))
}

/// Engine for the single fixture origin
pub fn engine(config: Config, launcher: FixtureLauncher) -> Arc<CrawlerEngine> {
    engine_for(config, launcher, &[FIXTURE_ORIGIN])
}
