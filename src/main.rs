//! Fathom main entry point
//!
//! This is the command-line interface for the Fathom site crawler.

use clap::{ArgGroup, Parser};
use fathom_crawler::config::{load_config_with_hash, parse_seed_list, read_seed_file, validate};
use fathom_crawler::crawler::crawl;
use fathom_crawler::{BatchResult, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Fathom: a polite, browser-driven site crawler
///
/// Fathom renders each page in a headless browser, respects robots.txt,
/// exercises dropdowns to reveal dynamic content, and crawls several sites
/// at once. Each site gets its own output directory with one text file per
/// page and a crawl summary.
#[derive(Parser, Debug)]
#[command(name = "fathom-crawler")]
#[command(version)]
#[command(about = "A polite, browser-driven site crawler", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["urls", "seeds"])))]
struct Cli {
    /// Seed URLs to crawl
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Seed list files (one URL per line, '#' comments)
    #[arg(long, value_name = "FILE", num_args = 1..)]
    seeds: Vec<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from each seed (0 = unlimited)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Maximum pages per site (0 = unlimited)
    #[arg(short, long)]
    pages: Option<u32>,

    /// Time limit per site in minutes (0 = unlimited)
    #[arg(short, long)]
    time_limit: Option<u64>,

    /// Number of sites crawled at once
    #[arg(short, long)]
    concurrent: Option<usize>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Hard ceiling for the whole batch in minutes (0 = none)
    #[arg(long, value_name = "MINUTES")]
    batch_timeout: Option<u64>,

    /// Do not exercise dropdown controls
    #[arg(long)]
    no_dynamic: bool,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config)?;

    let seeds = collect_seeds(&cli)?;
    if seeds.is_empty() {
        tracing::error!("No seed URLs given");
        return Err("no seed URLs to crawl".into());
    }

    if cli.dry_run {
        handle_dry_run(&config, &seeds)?;
    } else {
        handle_crawl(config, seeds).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fathom_crawler=info,warn"),
            1 => EnvFilter::new("fathom_crawler=debug,info"),
            2 => EnvFilter::new("fathom_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the file (or default) configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(pages) = cli.pages {
        config.crawler.max_pages = pages;
    }
    if let Some(minutes) = cli.time_limit {
        config.crawler.time_limit_minutes = minutes;
    }
    if let Some(concurrent) = cli.concurrent {
        config.crawler.max_concurrent = concurrent;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(minutes) = cli.batch_timeout {
        config.crawler.batch_timeout_minutes = minutes;
    }
    if cli.no_dynamic {
        config.crawler.explore_dynamic = false;
    }
    if cli.headful {
        config.browser.headless = false;
    }
}

/// Gathers seeds from positional URLs and seed files, dropping duplicates
fn collect_seeds(cli: &Cli) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut seeds = parse_seed_list(&cli.urls.join("\n"));

    for path in &cli.seeds {
        match read_seed_file(path) {
            Ok(file_seeds) => {
                tracing::info!("Read {} seed(s) from {}", file_seeds.len(), path.display());
                seeds.extend(file_seeds);
            }
            Err(e) => {
                tracing::error!("{}", e);
                return Err(e.into());
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    seeds.retain(|seed| seen.insert(seed.clone()));
    Ok(seeds)
}

/// Handles the --dry-run mode: shows the resolved settings and seeds
fn handle_dry_run(config: &Config, seeds: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Fathom Dry Run ===\n");
    println!("{}", toml::to_string_pretty(config)?);

    println!("Seeds ({}):", seeds.len());
    for seed in seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} site(s), {} at a time",
        seeds.len(),
        config.crawler.max_concurrent
    );

    Ok(())
}

/// Handles the main crawl operation
///
/// Individual job failures are reported in the results table and the batch
/// summary; they do not make the process fail.
async fn handle_crawl(config: Config, seeds: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Total seed URLs: {}", seeds.len());

    match crawl(config, seeds).await {
        Ok(batch) => {
            print_results(&batch);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_results(batch: &BatchResult) {
    println!("\n=== Crawl Results ===\n");
    for result in &batch.results {
        if result.success {
            println!(
                "✓ {} - {} pages -> {}",
                result.url,
                result.pages_crawled.unwrap_or(0),
                result.output_location.as_deref().unwrap_or("-")
            );
        } else {
            println!(
                "✗ {} - {}",
                result.url,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!(
        "\n{} succeeded, {} failed, {} pages in {:.2} minutes",
        batch.succeeded_count(),
        batch.failed_count(),
        batch.total_pages(),
        batch.elapsed.as_secs_f64() / 60.0
    );
}
