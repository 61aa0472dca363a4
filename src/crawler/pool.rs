//! Bounded scrape pool
//!
//! Spawns one task per leaf URL. Each task takes a semaphore permit right
//! before its fetch and gives it back as soon as the response arrives, so at
//! most `concurrency` fetches are in flight while parsing runs unbounded.

use crate::crawler::aggregator::{ResultAggregator, ScrapeReport};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::Parser;
use crate::crawler::record::ScrapeOutcome;
use crate::crawler::worklist::Worklist;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Scrapes every URL with at most `concurrency` fetches in flight
///
/// Empty URLs are skipped. Failed URLs are logged and left out of the
/// records; the returned stats account for every input URL.
///
/// A `concurrency` of 0 is treated as 1.
pub async fn scrape(
    urls: Vec<String>,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
    concurrency: usize,
    deadline: Option<Instant>,
) -> ScrapeReport {
    let concurrency = concurrency.max(1);
    tracing::info!(
        "Scraping {} URLs with concurrency {}",
        urls.len(),
        concurrency
    );

    let tokens = Arc::new(Semaphore::new(concurrency));
    let mut worklist = Worklist::new(deadline);
    let mut aggregator = ResultAggregator::new();

    for url in urls {
        if url.is_empty() {
            aggregator.record_skipped();
            continue;
        }
        aggregator.record_attempt();
        worklist.spawn(scrape_page(
            url,
            fetcher.clone(),
            parser.clone(),
            tokens.clone(),
        ));
    }

    let mut completed = 0usize;
    while let Some(finished) = worklist.next().await {
        completed += 1;
        if completed % 100 == 0 {
            tracing::info!(
                "Progress: {} of {} pages done, {} records",
                completed,
                worklist.spawned(),
                aggregator.len()
            );
        }
        match finished {
            Some(outcome) => aggregator.record(outcome),
            None => aggregator.record_abandoned(),
        }
    }

    let report = aggregator.finish(worklist.abandoned(), worklist.is_expired());
    tracing::info!(
        "Scrape done: {} succeeded, {} failed, {} skipped",
        report.stats.succeeded,
        report.stats.failed(),
        report.stats.skipped_empty
    );
    report
}

/// Fetches and parses one page
///
/// Returns `None` without fetching if no permit can be taken.
async fn scrape_page(
    url: String,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
    tokens: Arc<Semaphore>,
) -> Option<ScrapeOutcome> {
    let fetched = {
        let _permit = tokens.acquire().await.ok()?;
        tracing::debug!("Requesting URL: {}", url);
        fetcher.fetch(&url).await
    };

    let page = match fetched {
        Ok(page) => page,
        Err(error) => {
            tracing::warn!("Failed to fetch {}: {}", url, error);
            return Some(ScrapeOutcome::FetchFailed { url, error });
        }
    };

    Some(match parser.page_metadata(&page) {
        Ok(record) => ScrapeOutcome::Scraped(record),
        Err(error) => {
            tracing::warn!("Failed to parse {}: {}", url, error);
            ScrapeOutcome::ParseFailed { url, error }
        }
    })
}
