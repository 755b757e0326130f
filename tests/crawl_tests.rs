//! Integration tests for single-site crawls

mod common;

use common::{engine, engine_for, page_with_links, test_config, FixtureLauncher, FixtureSite};
use fathom_crawler::{normalize_url, CrawlJob, TerminationReason};
use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn job(seed: &str, max_depth: u32, max_pages: u32) -> CrawlJob {
    CrawlJob {
        seed_url: seed.to_string(),
        max_depth,
        max_pages,
        max_time: None,
    }
}

fn crawled_urls(summary: &fathom_crawler::CrawlSummary) -> Vec<String> {
    summary.crawled_pages.iter().map(|p| p.url.clone()).collect()
}

#[tokio::test]
async fn test_no_duplicate_visits() {
    let site = FixtureSite::new()
        .page(
            "https://fixture.test/",
            page_with_links(
                "Home",
                &[
                    "/a",
                    "/a/",
                    "https://www.fixture.test/a",
                    "/a?ref=home",
                    "/a#top",
                    "/b",
                ],
            ),
        )
        .page(
            "https://fixture.test/a",
            page_with_links("A", &["/", "/b", "https://fixture.test/b/"]),
        )
        .page("https://fixture.test/b", page_with_links("B", &["/a", "/"]));

    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(site));

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 0, 0), &CancellationToken::new())
        .await
        .unwrap();

    let urls = crawled_urls(&summary);
    let unique: HashSet<&String> = urls.iter().collect();
    assert_eq!(urls.len(), unique.len());
    assert_eq!(
        urls,
        vec![
            "https://fixture.test/",
            "https://fixture.test/a",
            "https://fixture.test/b"
        ]
    );
    assert_eq!(summary.pages_crawled, summary.crawled_pages.len());
    assert_eq!(summary.termination, TerminationReason::FrontierExhausted);
}

#[tokio::test]
async fn test_depth_bound() {
    let site = FixtureSite::new()
        .page("https://fixture.test/", page_with_links("Root", &["/one"]))
        .page("https://fixture.test/one", page_with_links("One", &["/two"]))
        .page("https://fixture.test/two", page_with_links("Two", &["/three"]))
        .page("https://fixture.test/three", page_with_links("Three", &["/four"]))
        .page("https://fixture.test/four", page_with_links("Four", &[]));

    let tmp = TempDir::new().unwrap();
    let launcher = FixtureLauncher::new(site);
    let stats = launcher.stats();
    let engine = engine(test_config(tmp.path()), launcher);

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 2, 0), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.pages_crawled, 3);
    assert!(summary.crawled_pages.iter().all(|p| p.depth <= 2));
    assert!(!stats
        .navigations()
        .iter()
        .any(|u| u.ends_with("/three") || u.ends_with("/four")));
}

#[tokio::test]
async fn test_page_budget() {
    let links: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let mut site = FixtureSite::new().page(
        "https://fixture.test/",
        page_with_links("Root", &link_refs),
    );
    for link in &links {
        site = site.page(&format!("https://fixture.test{}", link), page_with_links(link, &[]));
    }

    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(site));

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 0, 7), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.pages_crawled, 7);
    assert_eq!(summary.termination, TerminationReason::PageBudgetReached);
}

#[tokio::test]
async fn test_time_budget_with_tolerance() {
    let links: Vec<String> = (0..50).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let mut site = FixtureSite::new().page(
        "https://fixture.test/",
        page_with_links("Root", &link_refs),
    );
    for link in &links {
        site = site.page(&format!("https://fixture.test{}", link), page_with_links(link, &[]));
    }

    let tmp = TempDir::new().unwrap();
    let launcher = FixtureLauncher::new(site).with_latency(Duration::from_millis(100));
    let engine = engine(test_config(tmp.path()), launcher);

    let budget = Duration::from_millis(350);
    let crawl = CrawlJob {
        max_time: Some(budget),
        ..job("https://fixture.test/", 0, 0)
    };

    let summary = engine
        .crawl_site(&crawl, &CancellationToken::new())
        .await
        .unwrap();

    // The budget is checked between pages, so one in-flight page may overrun it
    let tolerance = Duration::from_millis(400);
    assert_eq!(summary.termination, TerminationReason::TimeBudgetReached);
    assert!(summary.elapsed_seconds <= (budget + tolerance).as_secs_f64());
    assert!(summary.pages_crawled >= 1);
    assert!(summary.pages_crawled < 51);
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;

    let origin = server.uri();
    let site = FixtureSite::new()
        .page(
            &format!("{}/", origin),
            page_with_links("Home", &["/private", "/public", "/private/deeper"]),
        )
        .page(&format!("{}/public", origin), page_with_links("Public", &["/private"]))
        .page(&format!("{}/private", origin), page_with_links("Private", &[]))
        .page(&format!("{}/private/deeper", origin), page_with_links("Deeper", &[]));

    let tmp = TempDir::new().unwrap();
    let launcher = FixtureLauncher::new(site);
    let stats = launcher.stats();
    let engine = engine_for(test_config(tmp.path()), launcher, &[]);

    let summary = engine
        .crawl_site(&job(&format!("{}/", origin), 0, 0), &CancellationToken::new())
        .await
        .unwrap();

    assert!(!stats.navigations().iter().any(|u| u.contains("/private")));
    assert_eq!(summary.disallowed_count, 2);
    assert_eq!(summary.pages_crawled, 2);
    assert!(crawled_urls(&summary)
        .iter()
        .any(|u| u.ends_with("/public")));
}

fn dropdown_site() -> FixtureSite {
    let base = "<html><head><title>Funds</title></head><body><main>\
        <p>Choose a region to see the funds available there. The list below updates when \
        a region is picked from the dropdown.</p>\
        <select id=\"region\">\
          <option value=\"\">Choose...</option>\
          <option value=\"A\">Region A</option>\
          <option value=\"B\">Region B</option>\
        </select>\
        <a href=\"/about\">About</a>\
        </main></body></html>";

    let revealed = "<html><head><title>Funds</title></head><body><main>\
        <p>Funds in Region B: Alpha Growth, Beta Income. See the hidden page for the full \
        list of funds offered in this region.</p>\
        <select id=\"region\">\
          <option value=\"\">Choose...</option>\
          <option value=\"A\">Region A</option>\
          <option value=\"B\" selected>Region B</option>\
        </select>\
        <a href=\"/about\">About</a> <a href=\"/hidden\">All region B funds</a>\
        </main></body></html>";

    FixtureSite::new()
        .page("https://fixture.test/", base)
        .variant("https://fixture.test/", "select#region", "B", revealed)
        .page("https://fixture.test/about", page_with_links("About", &[]))
        .page("https://fixture.test/hidden", page_with_links("Hidden", &[]))
}

#[tokio::test]
async fn test_dynamic_discovery() {
    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(dropdown_site()));

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 0, 0), &CancellationToken::new())
        .await
        .unwrap();

    let urls = crawled_urls(&summary);
    assert!(urls.contains(&"https://fixture.test/hidden".to_string()));

    // One state per real option, including the one that changes nothing
    let root = &summary.crawled_pages[0];
    assert_eq!(root.url, "https://fixture.test/");
    assert_eq!(root.dynamic_states, 2);

    let artifact = std::fs::read_to_string(
        std::path::Path::new(&summary.output_location).join(&root.artifact),
    )
    .unwrap();
    assert!(artifact.contains("DYNAMIC CONTENT:"));
    assert!(artifact.contains("[2] SELECT: region = Region B"));
    assert!(artifact.contains("Alpha Growth"));
}

#[tokio::test]
async fn test_dynamic_discovery_disabled() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(tmp.path());
    config.crawler.explore_dynamic = false;
    let engine = engine(config, FixtureLauncher::new(dropdown_site()));

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 0, 0), &CancellationToken::new())
        .await
        .unwrap();

    let urls = crawled_urls(&summary);
    assert!(!urls.contains(&"https://fixture.test/hidden".to_string()));
    assert!(urls.contains(&"https://fixture.test/about".to_string()));
    assert_eq!(summary.crawled_pages[0].dynamic_states, 0);
}

#[tokio::test]
async fn test_domain_scoping() {
    let site = FixtureSite::new()
        .page(
            "https://fixture.test/",
            page_with_links(
                "Home",
                &[
                    "https://other.test/page",
                    "https://blog.fixture.test/",
                    "http://fixture.test:8080/",
                    "/local",
                ],
            ),
        )
        .page("https://fixture.test/local", page_with_links("Local", &[]))
        .page("https://other.test/page", page_with_links("Other", &[]))
        .page("https://blog.fixture.test/", page_with_links("Blog", &[]));

    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(site));

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 0, 0), &CancellationToken::new())
        .await
        .unwrap();

    let seed = normalize_url("https://fixture.test/").unwrap();
    for url in crawled_urls(&summary) {
        let url = normalize_url(&url).unwrap();
        assert_eq!(url.host_str(), seed.host_str());
        assert_eq!(url.port(), seed.port());
    }
    assert_eq!(summary.pages_crawled, 2);
}

#[tokio::test]
async fn test_depth_one_scenario() {
    let site = FixtureSite::new()
        .page(
            "https://fixture.test/",
            page_with_links("Root", &["/a", "/b", "/c", "/d", "/e", "/f"]),
        )
        .page("https://fixture.test/a", page_with_links("A", &["/a/deep"]))
        .page("https://fixture.test/b", page_with_links("B", &["/b/deep"]))
        .page("https://fixture.test/c", page_with_links("C", &[]))
        .page("https://fixture.test/d", page_with_links("D", &[]))
        .page("https://fixture.test/e", page_with_links("E", &[]))
        .page("https://fixture.test/f", page_with_links("F", &[]))
        .page("https://fixture.test/a/deep", page_with_links("Deep A", &[]))
        .page("https://fixture.test/b/deep", page_with_links("Deep B", &[]));

    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(site));

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 1, 5), &CancellationToken::new())
        .await
        .unwrap();

    assert!(summary.pages_crawled <= 5);
    assert_eq!(summary.pages_crawled, 5);
    assert_eq!(summary.crawled_pages[0].depth, 0);
    assert_eq!(
        summary.crawled_pages.iter().filter(|p| p.depth == 1).count(),
        4
    );
    assert!(summary.crawled_pages.iter().all(|p| p.depth <= 1));
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let site = FixtureSite::new().page(
        "https://fixture.test/",
        page_with_links("Home", &["/missing", "/present"]),
    )
    .page("https://fixture.test/present", page_with_links("Present", &[]));

    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(site));

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 0, 0), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.failed_count, 1);
    assert_eq!(summary.unique_urls, 3);
}

#[tokio::test]
async fn test_output_artifacts() {
    let site = FixtureSite::new()
        .page("https://fixture.test/", page_with_links("Home", &["/about/team"]))
        .page("https://fixture.test/about/team", page_with_links("Team", &[]));

    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(site));

    let summary = engine
        .crawl_site(&job("fixture.test", 0, 0), &CancellationToken::new())
        .await
        .unwrap();

    let dir = tmp.path().join("fixture.test");
    assert_eq!(std::path::Path::new(&summary.output_location), dir.as_path());

    let index = std::fs::read_to_string(dir.join("index.txt")).unwrap();
    assert!(index.starts_with("URL: https://fixture.test/\nTITLE: Home\n\nBASE CONTENT:\n"));
    assert!(index.contains("This is the Home page"));
    assert!(!index.contains("DYNAMIC CONTENT:"));

    assert!(dir.join("about_team.txt").exists());

    let text = std::fs::read_to_string(dir.join("crawl_summary.txt")).unwrap();
    assert!(text.starts_with("Crawl Summary for https://fixture.test/\n"));
    assert!(text.contains("Pages Crawled: 2\n"));
    assert!(text.contains("2. https://fixture.test/about/team\n"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("crawl_summary.json")).unwrap())
            .unwrap();
    assert_eq!(json["pages_crawled"], 2);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let site = FixtureSite::new().page("https://fixture.test/", page_with_links("Home", &[]));

    let tmp = TempDir::new().unwrap();
    let launcher = FixtureLauncher::new(site);
    let stats = launcher.stats();
    let engine = engine(test_config(tmp.path()), launcher);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = engine
        .crawl_site(&job("https://fixture.test/", 0, 0), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.termination, TerminationReason::Cancelled);
    assert_eq!(summary.pages_crawled, 0);
    assert_eq!(stats.open(), 0);
}

#[tokio::test]
async fn test_launch_failure_fails_job() {
    let site = FixtureSite::new().page("https://fixture.test/", page_with_links("Home", &[]));

    let tmp = TempDir::new().unwrap();
    let engine = engine(test_config(tmp.path()), FixtureLauncher::new(site).failing());

    let err = engine
        .crawl_site(&job("https://fixture.test/", 0, 0), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("fixture launch failure"));
}
