//! Crawler module for sitemap expansion and page scraping
//!
//! This module contains the core crawling logic, including:
//! - URL classification into sitemaps and pages
//! - HTTP fetching with a rotating User-Agent
//! - Sitemap and HTML metadata extraction
//! - Concurrent sitemap expansion and token-gated scraping
//! - Overall crawl coordination

mod aggregator;
mod classifier;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod pool;
mod record;
mod worklist;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{ResultAggregator, ScrapeReport, ScrapeStats};
pub use classifier::{classify, partition, UrlKind};
pub use coordinator::{
    export_report, run_crawl, Coordinator, CrawlOptions, CrawlOutcome, CrawlReport,
};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher, UserAgentPool, DEFAULT_USER_AGENTS};
pub use frontier::{expand, ExpandOptions, ExpansionReport, ExpansionStats};
pub use parser::{DefaultParser, Parser, ParserKind};
pub use pool::scrape;
pub use record::{FetchedPage, PageRecord, ScrapeOutcome};
pub use worklist::Worklist;

use crate::config::Config;
use crate::SiftError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher and parser
/// 2. Expand the root sitemap into leaf page URLs
/// 3. Scrape every leaf page under the concurrency cap
/// 4. Export results to the configured outputs
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash identifying the configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished; export errors are carried inside
/// * `Err(SiftError)` - Setup failed
pub async fn crawl(config: &Config, config_hash: &str) -> Result<CrawlOutcome, SiftError> {
    run_crawl(config, config_hash).await
}
