//! Robots.txt handling module
//!
//! This module fetches, parses, and caches robots.txt per origin. Fetch
//! failures never block crawling: any origin whose robots.txt cannot be
//! retrieved gets a permissive policy with the configured default delay.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use crate::config::{Config, UserAgentConfig};
use crate::url::origin_of;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Robots rules and politeness delay for one origin
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    origin: String,
    agent: String,
    crawl_delay: Duration,
    rules: ParsedRobots,
    fetched_successfully: bool,
}

impl RobotsPolicy {
    /// Builds a policy from a fetched robots.txt body
    ///
    /// # Arguments
    ///
    /// * `origin` - `scheme://host[:port]` the file was served from
    /// * `agent` - The robots.txt product token to match groups against
    /// * `content` - Raw robots.txt body
    /// * `default_delay` - Delay used when no applicable `Crawl-delay` exists
    pub fn from_robots_txt(
        origin: impl Into<String>,
        agent: impl Into<String>,
        content: &str,
        default_delay: Duration,
    ) -> Self {
        let agent = agent.into();
        let rules = ParsedRobots::from_content(content);
        let crawl_delay = rules
            .crawl_delay(&agent)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(default_delay);

        Self {
            origin: origin.into(),
            agent,
            crawl_delay,
            rules,
            fetched_successfully: true,
        }
    }

    /// Builds the allow-everything policy used when robots.txt is unavailable
    pub fn permissive(
        origin: impl Into<String>,
        agent: impl Into<String>,
        default_delay: Duration,
    ) -> Self {
        Self {
            origin: origin.into(),
            agent: agent.into(),
            crawl_delay: default_delay,
            rules: ParsedRobots::allow_all(),
            fetched_successfully: false,
        }
    }

    /// Returns true if the crawler may fetch `url`
    pub fn can_fetch(&self, url: &Url) -> bool {
        self.rules.is_allowed(url.as_str(), &self.agent)
    }

    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn fetched_successfully(&self) -> bool {
        self.fetched_successfully
    }
}

/// Builds the HTTP client used for robots.txt requests
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches robots.txt lazily and caches one policy per origin
#[derive(Debug)]
pub struct RobotsResolver {
    client: Client,
    cache: RobotsCache,
    agent: String,
    default_delay: Duration,
}

impl RobotsResolver {
    /// Creates a resolver from the crawler configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.crawler.robots_timeout())?;
        Ok(Self::with_client(
            client,
            config.user_agent.crawler_name.clone(),
            config.crawler.default_crawl_delay(),
        ))
    }

    /// Creates a resolver around an existing HTTP client
    pub fn with_client(client: Client, agent: impl Into<String>, default_delay: Duration) -> Self {
        Self {
            client,
            cache: RobotsCache::new(),
            agent: agent.into(),
            default_delay,
        }
    }

    /// Returns the policy for the origin of `url`, fetching it on first use
    ///
    /// Never fails: a network error, timeout, or non-200 status yields a
    /// permissive policy which is cached like any other.
    pub async fn resolve(&self, url: &Url) -> Arc<RobotsPolicy> {
        let origin = origin_of(url).unwrap_or_else(|| url.as_str().to_string());

        if let Some(policy) = self.cache.get(&origin) {
            return policy;
        }

        let policy = self.fetch(&origin).await;
        self.cache.insert(policy)
    }

    /// Seeds the cache with a known policy, bypassing the network
    pub fn preload(&self, policy: RobotsPolicy) -> Arc<RobotsPolicy> {
        self.cache.insert(policy)
    }

    /// Number of origins resolved so far
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    async fn fetch(&self, origin: &str) -> RobotsPolicy {
        let robots_url = format!("{}/robots.txt", origin);
        debug!("Fetching {}", robots_url);

        let response = match self.client.get(&robots_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error fetching robots.txt from {}: {}", robots_url, e);
                return self.fallback(origin);
            }
        };

        if response.status() != StatusCode::OK {
            warn!(
                "Could not fetch robots.txt from {} (status: {})",
                robots_url,
                response.status()
            );
            return self.fallback(origin);
        }

        match response.text().await {
            Ok(body) => {
                let policy =
                    RobotsPolicy::from_robots_txt(origin, &self.agent, &body, self.default_delay);
                info!(
                    "Parsed robots.txt from {} (crawl delay {:.1}s)",
                    robots_url,
                    policy.crawl_delay().as_secs_f64()
                );
                policy
            }
            Err(e) => {
                warn!("Error reading robots.txt from {}: {}", robots_url, e);
                self.fallback(origin)
            }
        }
    }

    fn fallback(&self, origin: &str) -> RobotsPolicy {
        RobotsPolicy::permissive(origin, &self.agent, self.default_delay)
    }
}
