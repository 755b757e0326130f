//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of a single-site crawl job
//! - `TerminationReason`: why a job stopped crawling

mod crawl_state;

pub use crawl_state::{CrawlState, TerminationReason};
