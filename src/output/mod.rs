//! Output module for rendering crawl artifacts
//!
//! This module formats:
//! - Per-page text artifacts
//! - Per-site crawl summaries (text and JSON)
//! - The batch-level JSON summary

mod batch;
mod page_text;
mod summary;

pub use batch::format_batch_json;
pub use page_text::{artifact_stem, format_page_text};
pub use summary::{format_summary_json, format_summary_text, SUMMARY_JSON_FILE, SUMMARY_TEXT_FILE};
