//! Crawler module for rendering, exploring and crawling sites
//!
//! This module contains the core crawling logic, including:
//! - Browser-driven page fetching with an escalating navigation strategy
//! - Content extraction, link extraction and dropdown exploration
//! - The per-site crawl loop and its frontier
//! - Bounded-concurrency batches of site crawls

mod batch;
mod content;
mod coordinator;
mod engine;
mod explorer;
mod fetcher;
mod frontier;
mod parser;
mod types;

pub use batch::run_batch;
pub use content::{extract_base_content, EMPTY_CONTENT, NON_HTML_CONTENT};
pub use coordinator::Coordinator;
pub use engine::CrawlerEngine;
pub use explorer::{explore, Exploration, ExploreSettings};
pub use fetcher::{fetch_and_render, FetchSettings, RenderedPage};
pub use frontier::{EnqueueOutcome, Frontier, FrontierEntry};
pub use parser::{find_select_controls, parse_html, ParsedPage, SelectControl, SelectOption};
pub use types::{BatchResult, CrawlJob, CrawlSummary, CrawledPage, JobResult};

use crate::config::Config;
use crate::FathomError;
use std::sync::Arc;

/// Crawls a set of seeds using the settings in `config`
///
/// This is the main entry point for the CLI. It will:
/// 1. Build the engine (robots client, browser launcher, output store)
/// 2. Run one job per seed with the configured concurrency
/// 3. Write the batch summary
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
/// * `seeds` - Seed URLs
///
/// # Returns
///
/// * `Ok(BatchResult)` - Per-seed results; individual jobs may have failed
/// * `Err(FathomError)` - The engine could not be built
pub async fn crawl(config: Config, seeds: Vec<String>) -> Result<BatchResult, FathomError> {
    let max_concurrent = config.crawler.max_concurrent;
    let overall_timeout = config.crawler.batch_timeout();
    let engine = Arc::new(CrawlerEngine::new(config)?);

    Ok(run_batch(engine, seeds, max_concurrent, overall_timeout).await)
}
