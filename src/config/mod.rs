//! Configuration module for Fathom
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and reading seed lists.
//!
//! # Example
//!
//! ```no_run
//! use fathom_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fathom.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod seeds;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, ExtractionConfig, OutputConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use seeds::{parse_seed_list, read_seed_file};
pub use validation::validate;
