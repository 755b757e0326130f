//! Batch concurrency manager
//!
//! Runs one crawl job per seed with at most `max_concurrent` jobs (and so at
//! most `max_concurrent` browsers) alive at once. Each job reports on its
//! own; a failing or panicking job never affects its siblings.

use crate::crawler::engine::CrawlerEngine;
use crate::crawler::types::{BatchResult, CrawlJob, JobResult};
use crate::FathomError;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

/// Crawls every seed with bounded parallelism and collects per-seed results
///
/// # Arguments
///
/// * `engine` - Shared engine; job limits come from its `[crawler]` config
/// * `seeds` - Seed URLs, in the order results should be reported
/// * `max_concurrent` - Upper bound on simultaneously running jobs
/// * `overall_timeout` - Optional ceiling for the whole batch
///
/// # Returns
///
/// One `JobResult` per seed, in seed order. When the ceiling expires, running
/// jobs stop at their next suspension point and still report their partial
/// page counts; jobs that never started are reported as failed.
///
/// The batch summary artifact is written before returning; a failure to
/// write it is logged but does not change the results.
pub async fn run_batch(
    engine: Arc<CrawlerEngine>,
    seeds: Vec<String>,
    max_concurrent: usize,
    overall_timeout: Option<Duration>,
) -> BatchResult {
    let started = Instant::now();
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();

    info!(
        "Starting batch of {} site(s), {} at a time",
        seeds.len(),
        max_concurrent.max(1)
    );

    for (index, seed) in seeds.iter().enumerate() {
        let job = CrawlJob::from_config(seed.clone(), &engine.config().crawler);
        let engine = Arc::clone(&engine);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let span = info_span!("crawl", seed = %seed);

        tasks.spawn(
            async move {
                let result = AssertUnwindSafe(run_job(&engine, &job, &semaphore, &cancel))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        let err = FathomError::JobPanicked {
                            url: job.seed_url.clone(),
                            message: panic_message(panic.as_ref()),
                        };
                        error!("{}", err);
                        JobResult::failed(&job.seed_url, &err.to_string())
                    });
                (index, result)
            }
            .instrument(span),
        );
    }

    let mut slots: Vec<Option<JobResult>> = vec![None; seeds.len()];
    let deadline = overall_timeout.map(|t| tokio::time::Instant::now() + t);

    loop {
        let joined = match deadline {
            Some(deadline) if !cancel.is_cancelled() => {
                tokio::select! {
                    joined = tasks.join_next() => joined,
                    _ = tokio::time::sleep_until(deadline) => {
                        warn!("Batch timeout reached, cancelling remaining jobs");
                        cancel.cancel();
                        continue;
                    }
                }
            }
            _ => tasks.join_next().await,
        };

        match joined {
            Some(Ok((index, result))) => slots[index] = Some(result),
            Some(Err(e)) => error!("Crawl task ended abnormally: {}", e),
            None => break,
        }
    }

    let results: Vec<JobResult> = slots
        .into_iter()
        .zip(seeds.iter())
        .map(|(slot, seed)| {
            slot.unwrap_or_else(|| JobResult::failed(seed, "Crawl task ended without a result"))
        })
        .collect();

    let batch = BatchResult {
        results,
        elapsed: started.elapsed(),
    };

    info!(
        "Batch finished in {:.2} minutes: {} succeeded, {} failed",
        batch.elapsed.as_secs_f64() / 60.0,
        batch.succeeded_count(),
        batch.failed_count()
    );

    if let Err(e) = engine.store().write_batch(&batch) {
        error!("Failed to write batch summary: {}", e);
    }

    batch
}

/// Waits for a slot, then crawls one site
async fn run_job(
    engine: &CrawlerEngine,
    job: &CrawlJob,
    semaphore: &Arc<Semaphore>,
    cancel: &CancellationToken,
) -> JobResult {
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        permit = Arc::clone(semaphore).acquire_owned() => permit.ok(),
    };

    let Some(_permit) = permit else {
        let err = FathomError::Cancelled {
            url: job.seed_url.clone(),
        };
        warn!("{}", err);
        return JobResult::failed(&job.seed_url, &err.to_string());
    };

    let started = Instant::now();
    match engine.crawl_site(job, cancel).await {
        Ok(summary) => {
            info!(
                "Crawled {} pages from {} ({})",
                summary.pages_crawled, job.seed_url, summary.termination
            );
            JobResult::succeeded(
                &job.seed_url,
                summary.output_location,
                summary.pages_crawled,
                started.elapsed(),
            )
        }
        Err(e) => {
            error!("Crawl of {} failed: {}", job.seed_url, e);
            JobResult::failed(&job.seed_url, &e.to_string())
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
