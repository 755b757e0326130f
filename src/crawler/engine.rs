//! Process-wide crawler engine
//!
//! The engine owns everything that outlives a single job: the configuration,
//! the robots.txt cache, the browser launcher and the output store. Jobs borrow
//! it through an `Arc`, so there is no global mutable state.

use crate::browser::{BrowserLauncher, BrowserSession, ChromiumLauncher};
use crate::config::Config;
use crate::crawler::coordinator::Coordinator;
use crate::crawler::types::{CrawlJob, CrawlSummary};
use crate::robots::RobotsResolver;
use crate::storage::{ContentStore, FsStore};
use crate::url::{normalize_url, with_default_scheme};
use crate::FathomError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Shared owner of the robots cache, browser launcher and output store
pub struct CrawlerEngine {
    config: Arc<Config>,
    robots: Arc<RobotsResolver>,
    launcher: Arc<dyn BrowserLauncher>,
    store: Arc<dyn ContentStore>,
}

impl CrawlerEngine {
    /// Creates an engine backed by Chromium and the local filesystem
    ///
    /// # Arguments
    ///
    /// * `config` - Validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlerEngine)` - Ready to run jobs
    /// * `Err(FathomError)` - The robots.txt HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, FathomError> {
        let robots = RobotsResolver::new(&config)?;
        let launcher = ChromiumLauncher::new(&config);
        let store = FsStore::new(
            config.output.directory.clone(),
            config.output.batch_summary_file.clone(),
        );

        Ok(Self::with_components(
            config,
            robots,
            Arc::new(launcher),
            Arc::new(store),
        ))
    }

    /// Creates an engine from explicit parts
    pub fn with_components(
        config: Config,
        robots: RobotsResolver,
        launcher: Arc<dyn BrowserLauncher>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            robots: Arc::new(robots),
            launcher,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn robots(&self) -> &RobotsResolver {
        &self.robots
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Crawls one site end to end
    ///
    /// Launches a dedicated browser for the job, runs the crawl loop and always
    /// closes the browser afterwards, whatever the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The job terminated normally (including on a budget or cancellation)
    /// * `Err(FathomError)` - The seed was invalid, the browser failed to launch, or output could not be written
    pub async fn crawl_site(
        &self,
        job: &CrawlJob,
        cancel: &CancellationToken,
    ) -> Result<CrawlSummary, FathomError> {
        let seed = normalize_url(&with_default_scheme(&job.seed_url))?;

        let mut session = self.launcher.launch().await?;
        debug!("Browser launched for {}", seed);

        let result = self.run_job(job, &seed, session.as_mut(), cancel).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser for {}: {}", seed, e);
        }

        result
    }

    async fn run_job(
        &self,
        job: &CrawlJob,
        seed: &Url,
        session: &mut dyn BrowserSession,
        cancel: &CancellationToken,
    ) -> Result<CrawlSummary, FathomError> {
        let mut writer = self.store.open_site(seed)?;
        let mut coordinator = Coordinator::new(job, seed.clone(), &self.config, &self.robots);
        coordinator.run(session, writer.as_mut(), cancel).await
    }
}
