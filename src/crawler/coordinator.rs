//! Single-site crawl controller
//!
//! This module contains the main crawl loop for one seed URL, including:
//! - Budget checks (pages, wall-clock time, batch cancellation)
//! - Frontier processing with depth, resource-type and robots.txt filters
//! - Fetching, extraction and dropdown exploration
//! - Persisting one record per page and the final summary

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::crawler::content::extract_base_content;
use crate::crawler::explorer::{explore, ExploreSettings};
use crate::crawler::fetcher::{fetch_and_render, FetchSettings};
use crate::crawler::frontier::{EnqueueOutcome, Frontier, FrontierEntry};
use crate::crawler::parser::parse_html;
use crate::crawler::types::{CrawlJob, CrawlSummary, CrawledPage};
use crate::robots::RobotsResolver;
use crate::state::{CrawlState, TerminationReason};
use crate::storage::{PageRecord, SiteWriter};
use crate::url::ResourceFilter;
use crate::FathomError;
use chrono::Local;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// How often (in crawled pages) a progress line is logged
const PROGRESS_INTERVAL: usize = 10;

/// Drives one crawl job from its seed to termination
pub struct Coordinator<'a> {
    config: &'a Config,
    robots: &'a RobotsResolver,
    seed: Url,
    page_limit: Option<usize>,
    time_limit: Option<Duration>,
    fetch_settings: FetchSettings,
    frontier: Frontier,
    state: CrawlState,
    crawled_pages: Vec<CrawledPage>,
    disallowed_count: usize,
    failed_count: usize,
    started: Instant,
}

impl<'a> Coordinator<'a> {
    /// Creates a coordinator for a job whose seed is already normalized
    ///
    /// # Arguments
    ///
    /// * `job` - Limits for this crawl
    /// * `seed` - Normalized seed URL; defines the site scope
    /// * `config` - Crawler configuration
    /// * `robots` - Shared robots.txt resolver
    pub fn new(job: &CrawlJob, seed: Url, config: &'a Config, robots: &'a RobotsResolver) -> Self {
        let filter = ResourceFilter::new(&config.extraction.skip_extensions);
        let mut frontier = Frontier::new(&seed, filter, job.depth_limit());

        if frontier.enqueue(seed.as_str(), 0) != EnqueueOutcome::Queued {
            warn!("Seed {} is not a crawlable document", seed);
        }

        Self {
            config,
            robots,
            seed,
            page_limit: job.page_limit(),
            time_limit: job.max_time,
            fetch_settings: FetchSettings::from_config(config),
            frontier,
            state: CrawlState::Initializing,
            crawled_pages: Vec::new(),
            disallowed_count: 0,
            failed_count: 0,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl loop until a budget is reached, the frontier empties,
    /// or `cancel` fires
    ///
    /// Per-page problems (navigation failures, robots denials, misbehaving
    /// controls) are logged and counted. Only storage failures abort the job.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The crawl terminated normally and its summary was written
    /// * `Err(FathomError)` - A page record or the summary could not be persisted
    pub async fn run(
        &mut self,
        session: &mut dyn BrowserSession,
        writer: &mut dyn SiteWriter,
        cancel: &CancellationToken,
    ) -> Result<CrawlSummary, FathomError> {
        self.started = Instant::now();

        if cancel.is_cancelled() {
            self.transition(CrawlState::Terminating(TerminationReason::Cancelled));
        } else {
            info!("Starting crawl of {}", self.seed);
            self.transition(CrawlState::Running);
        }

        while self.state.is_running() {
            if let Some(reason) = self.budget_exhausted(cancel) {
                self.transition(CrawlState::Terminating(reason));
                break;
            }

            let Some(entry) = self.frontier.dequeue() else {
                self.transition(CrawlState::Terminating(TerminationReason::FrontierExhausted));
                break;
            };

            let url = entry.url.clone();
            let processed = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                processed = self.process_entry(entry, &mut *session, &mut *writer) => Some(processed),
            };

            match processed {
                Some(result) => result?,
                None => {
                    info!("Crawl of {} cancelled while processing {}", self.seed, url);
                    self.transition(CrawlState::Terminating(TerminationReason::Cancelled));
                }
            }
        }

        let reason = self
            .state
            .termination_reason()
            .unwrap_or(TerminationReason::FrontierExhausted);
        let summary = self.finish(reason, writer.location());
        writer.write_summary(&summary)?;

        info!(
            "Crawl of {} finished ({}): {} pages in {:.2} minutes",
            self.seed,
            reason,
            summary.pages_crawled,
            summary.elapsed_minutes()
        );

        Ok(summary)
    }

    fn budget_exhausted(&self, cancel: &CancellationToken) -> Option<TerminationReason> {
        if cancel.is_cancelled() {
            return Some(TerminationReason::Cancelled);
        }
        if self
            .page_limit
            .is_some_and(|limit| self.crawled_pages.len() >= limit)
        {
            info!("Reached page limit for {}", self.seed);
            return Some(TerminationReason::PageBudgetReached);
        }
        if self
            .time_limit
            .is_some_and(|limit| self.started.elapsed() >= limit)
        {
            info!("Reached time limit for {}", self.seed);
            return Some(TerminationReason::TimeBudgetReached);
        }
        None
    }

    fn transition(&mut self, next: CrawlState) {
        if self.state.can_transition_to(&next) {
            debug!("{}: {} -> {}", self.seed, self.state, next);
            self.state = next;
        } else {
            warn!(
                "{}: ignoring illegal transition {} -> {}",
                self.seed, self.state, next
            );
        }
    }

    /// Processes one dequeued URL
    ///
    /// This method:
    /// 1. Discards entries that are too deep, not documents, or disallowed
    /// 2. Fetches and renders the page
    /// 3. Extracts base content and explores dropdowns
    /// 4. Feeds discovered links back into the frontier
    /// 5. Persists the page record
    async fn process_entry(
        &mut self,
        entry: FrontierEntry,
        session: &mut dyn BrowserSession,
        writer: &mut dyn SiteWriter,
    ) -> Result<(), FathomError> {
        let FrontierEntry { url, depth } = entry;

        if self.frontier.is_too_deep(depth) {
            debug!("Discarding {} (depth {})", url, depth);
            self.frontier.discard(&url);
            return Ok(());
        }

        if !self.frontier.is_document(&url) {
            debug!("Discarding non-document {}", url);
            self.frontier.discard(&url);
            return Ok(());
        }

        let policy = self.robots.resolve(&url).await;
        if !policy.can_fetch(&url) {
            info!("URL {} disallowed by robots.txt", url);
            self.disallowed_count += 1;
            self.frontier.discard(&url);
            return Ok(());
        }

        if !self.frontier.mark_visited(&url) {
            return Ok(());
        }

        info!("Crawling {} (depth {})", url, depth);
        let page = match fetch_and_render(session, &url, &self.fetch_settings, policy.crawl_delay())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                self.failed_count += 1;
                return Ok(());
            }
        };

        let base_url = page
            .final_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or_else(|| url.clone());

        let base_content = extract_base_content(&page.html, &self.config.extraction);
        let static_links = parse_html(&page.html, &base_url).links;

        let exploration = if self.config.crawler.explore_dynamic {
            let settings = ExploreSettings {
                extraction: &self.config.extraction,
                settle_delay: policy.crawl_delay(),
                return_timeout: self.fetch_settings.fallback_timeout,
            };
            explore(session, &base_url, &page.html, &settings).await
        } else {
            Default::default()
        };

        let mut queued = 0;
        for link in static_links.iter().chain(exploration.links.iter()) {
            if self.frontier.enqueue(link, depth + 1) == EnqueueOutcome::Queued {
                queued += 1;
            }
        }
        debug!(
            "{}: {} static link(s), {} dynamic link(s), {} queued",
            url,
            static_links.len(),
            exploration.links.len(),
            queued
        );

        let record = PageRecord {
            url: url.to_string(),
            title: page.title,
            base_content,
            dynamic_states: exploration.states,
        };
        let artifact = writer.write_page(&record)?;

        self.crawled_pages.push(CrawledPage {
            url: record.url,
            title: record.title,
            depth,
            dynamic_states: record.dynamic_states.len(),
            artifact,
        });

        let pages = self.crawled_pages.len();
        if pages % PROGRESS_INTERVAL == 0 {
            info!(
                "Progress: {} pages crawled, {} in queue, {:.2} minutes elapsed, {} disallowed",
                pages,
                self.frontier.len(),
                self.started.elapsed().as_secs_f64() / 60.0,
                self.disallowed_count
            );
        }

        Ok(())
    }

    fn finish(&self, reason: TerminationReason, output_location: String) -> CrawlSummary {
        CrawlSummary {
            seed_url: self.seed.to_string(),
            finished_at: Local::now(),
            pages_crawled: self.crawled_pages.len(),
            unique_urls: self.frontier.visited_len(),
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
            disallowed_count: self.disallowed_count,
            failed_count: self.failed_count,
            termination: reason,
            output_location,
            crawled_pages: self.crawled_pages.clone(),
        }
    }
}
