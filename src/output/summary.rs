//! Per-site crawl summaries
//!
//! A human-readable `crawl_summary.txt` and a machine-readable
//! `crawl_summary.json` are written next to the page artifacts.

use crate::crawler::CrawlSummary;

pub const SUMMARY_TEXT_FILE: &str = "crawl_summary.txt";
pub const SUMMARY_JSON_FILE: &str = "crawl_summary.json";

/// Formats the human-readable summary
pub fn format_summary_text(summary: &CrawlSummary) -> String {
    let mut text = String::new();

    text.push_str(&format!("Crawl Summary for {}\n", summary.seed_url));
    text.push_str(&format!(
        "Date: {}\n",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S")
    ));
    text.push_str(&format!("Pages Crawled: {}\n", summary.pages_crawled));
    text.push_str(&format!("Unique URLs: {}\n", summary.unique_urls));
    text.push_str(&format!(
        "Disallowed by robots.txt: {}\n",
        summary.disallowed_count
    ));
    text.push_str(&format!("Stopped: {}\n", summary.termination));
    text.push_str(&format!(
        "Time Taken: {:.2} minutes\n\n",
        summary.elapsed_minutes()
    ));

    text.push_str("Crawled Pages:\n");
    for (i, page) in summary.crawled_pages.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, page.url));
    }

    text
}

/// Serializes the summary as pretty JSON
pub fn format_summary_json(summary: &CrawlSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::CrawledPage;
    use crate::state::TerminationReason;
    use chrono::{Local, TimeZone};

    fn summary() -> CrawlSummary {
        CrawlSummary {
            seed_url: "https://example.com/".to_string(),
            finished_at: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
            pages_crawled: 2,
            unique_urls: 3,
            elapsed_seconds: 90.0,
            disallowed_count: 1,
            failed_count: 1,
            termination: TerminationReason::FrontierExhausted,
            output_location: "output/example.com".to_string(),
            crawled_pages: vec![
                CrawledPage {
                    url: "https://example.com/".to_string(),
                    title: "Home".to_string(),
                    depth: 0,
                    dynamic_states: 0,
                    artifact: "index.txt".to_string(),
                },
                CrawledPage {
                    url: "https://example.com/about".to_string(),
                    title: "About".to_string(),
                    depth: 1,
                    dynamic_states: 2,
                    artifact: "about.txt".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_format_summary_text() {
        let text = format_summary_text(&summary());

        assert!(text.starts_with("Crawl Summary for https://example.com/\n"));
        assert!(text.contains("Date: 2024-03-09 14:05:00\n"));
        assert!(text.contains("Pages Crawled: 2\n"));
        assert!(text.contains("Unique URLs: 3\n"));
        assert!(text.contains("Time Taken: 1.50 minutes\n"));
        assert!(text.ends_with(
            "Crawled Pages:\n1. https://example.com/\n2. https://example.com/about\n"
        ));
    }

    #[test]
    fn test_format_summary_json() {
        let json = format_summary_json(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["pages_crawled"], 2);
        assert_eq!(value["termination"], "frontier_exhausted");
        assert_eq!(value["crawled_pages"][1]["dynamic_states"], 2);
    }
}
