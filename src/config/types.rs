use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Fathom
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub browser: BrowserConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Crawl budgets and politeness settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed (0 = unlimited)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum pages per site (0 = unlimited)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Wall-clock budget per site in minutes (0 = unlimited)
    #[serde(rename = "time-limit-minutes")]
    pub time_limit_minutes: u64,

    /// Number of sites crawled at once
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Politeness delay when robots.txt gives none (milliseconds)
    #[serde(rename = "default-crawl-delay-ms")]
    pub default_crawl_delay_ms: u64,

    /// Timeout for fetching robots.txt (milliseconds)
    #[serde(rename = "robots-timeout-ms")]
    pub robots_timeout_ms: u64,

    /// Whether to exercise dropdown controls on each page
    #[serde(rename = "explore-dynamic")]
    pub explore_dynamic: bool,

    /// Hard ceiling for the whole batch in minutes (0 = none)
    #[serde(rename = "batch-timeout-minutes")]
    pub batch_timeout_minutes: u64,
}

impl CrawlerConfig {
    pub fn default_crawl_delay(&self) -> Duration {
        Duration::from_millis(self.default_crawl_delay_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }

    /// Per-site time budget, `None` when unlimited
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_minutes > 0).then(|| Duration::from_secs(self.time_limit_minutes * 60))
    }

    /// Batch ceiling, `None` when unlimited
    pub fn batch_timeout(&self) -> Option<Duration> {
        (self.batch_timeout_minutes > 0)
            .then(|| Duration::from_secs(self.batch_timeout_minutes * 60))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 10,
            time_limit_minutes: 5,
            max_concurrent: 3,
            default_crawl_delay_ms: 2000,
            robots_timeout_ms: 10_000,
            explore_dynamic: true,
            batch_timeout_minutes: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt product token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// User-Agent header presented by the browser
    #[serde(rename = "browser-user-agent")]
    pub browser_user_agent: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "FathomCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/bot".to_string(),
            contact_email: "crawler@example.com".to_string(),
            browser_user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Headless browser settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    /// Explicit Chrome/Chromium binary; falls back to `CHROMIUM_PATH` then auto-detection
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<PathBuf>,

    /// Timeout for the strict "content loaded" navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Timeout for the lenient "committed" retry (milliseconds)
    #[serde(rename = "fallback-navigation-timeout-ms")]
    pub fallback_navigation_timeout_ms: u64,

    /// Timeout for each readiness selector wait (milliseconds)
    #[serde(rename = "readiness-timeout-ms")]
    pub readiness_timeout_ms: u64,

    #[serde(rename = "window-width")]
    pub window_width: u32,

    #[serde(rename = "window-height")]
    pub window_height: u32,
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn fallback_navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_navigation_timeout_ms)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            navigation_timeout_ms: 15_000,
            fallback_navigation_timeout_ms: 10_000,
            readiness_timeout_ms: 5_000,
            window_width: 1280,
            window_height: 800,
        }
    }
}

/// Content extraction heuristics
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Main-content region selectors, tried in order
    #[serde(rename = "content-selectors")]
    pub content_selectors: Vec<String>,

    /// A region must have more text than this to be accepted
    #[serde(rename = "min-content-length")]
    pub min_content_length: usize,

    /// Selector awaited (best effort) after navigation
    #[serde(rename = "readiness-selector")]
    pub readiness_selector: String,

    /// Path suffixes of non-document resources
    #[serde(rename = "skip-extensions")]
    pub skip_extensions: Vec<String>,

    /// Option values treated as "choose one..." placeholders (case-insensitive)
    #[serde(rename = "placeholder-option-values")]
    pub placeholder_option_values: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            content_selectors: [
                "main",
                "article",
                "[role=\"main\"]",
                "#content",
                ".content",
                ".main-content",
                ".page-content",
                ".article-content",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_content_length: 100,
            readiness_selector: "main, #content, .content, article".to_string(),
            skip_extensions: [
                ".svg", ".png", ".jpg", ".jpeg", ".gif", ".pdf", ".doc", ".docx", ".xls", ".xlsx",
                ".zip", ".tar", ".gz", ".mp3", ".mp4", ".avi", ".mov", ".wmv", ".css", ".js",
                ".xml", ".json", ".ico",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            placeholder_option_values: vec!["0".to_string(), "select".to_string()],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; one subdirectory is created per seed
    pub directory: PathBuf,

    /// File name of the batch summary, written inside `directory`
    #[serde(rename = "batch-summary-file")]
    pub batch_summary_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            batch_summary_file: "batch_summary.json".to_string(),
        }
    }
}
