//! Crawler coordinator - two-phase crawl orchestration
//!
//! This module ties the phases together:
//! - Expanding the sitemap tree into leaf page URLs
//! - Scraping the leaf pages under the concurrency cap
//! - Applying one deadline across both phases
//! - Exporting results to the configured outputs

use crate::config::Config;
use crate::crawler::aggregator::{ScrapeReport, ScrapeStats};
use crate::crawler::fetcher::{Fetcher, HttpFetcher, UserAgentPool};
use crate::crawler::frontier::{expand, ExpandOptions, ExpansionReport, ExpansionStats};
use crate::crawler::parser::Parser;
use crate::crawler::pool::scrape;
use crate::crawler::record::PageRecord;
use crate::output::{generate_markdown_summary, CrawlSummary, SqliteOutputHandler};
use crate::storage::SqliteStorage;
use crate::SiftError;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Engine settings independent of where URLs come from
#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    /// Maximum fetches in flight during the scrape phase
    pub concurrency: usize,
    /// Nested sitemaps deeper than this are not fetched
    pub max_sitemap_depth: u32,
    /// Wall-clock bound on both phases together
    pub crawl_timeout: Option<Duration>,
}

impl CrawlOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.crawler.concurrency as usize,
            max_sitemap_depth: config.crawler.max_sitemap_depth,
            crawl_timeout: config.crawler.crawl_timeout(),
        }
    }
}

/// Everything a crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Root sitemap URL
    pub root_url: String,
    /// Scraped pages, unordered
    pub records: Vec<PageRecord>,
    pub expansion: ExpansionStats,
    pub scrape: ScrapeStats,
    /// True if the crawl deadline cut either phase short
    pub timed_out: bool,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            records: Vec::new(),
            expansion: ExpansionStats::default(),
            scrape: ScrapeStats::default(),
            timed_out: false,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
    options: CrawlOptions,
}

impl Coordinator {
    /// Creates a coordinator from explicit collaborators
    pub fn new(fetcher: Arc<dyn Fetcher>, parser: Arc<dyn Parser>, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            parser,
            options,
        }
    }

    /// Creates a coordinator with the HTTP fetcher and parser the config names
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SiftError)` - Failed to build the HTTP client
    pub fn from_config(config: &Config) -> Result<Self, SiftError> {
        let user_agents = UserAgentPool::new(config.user_agent.pool.clone());
        let fetcher = HttpFetcher::new(config.crawler.request_timeout(), user_agents)?;
        let parser = config.crawler.parser.build();

        Ok(Self::new(
            Arc::new(fetcher),
            parser,
            CrawlOptions::from_config(config),
        ))
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Expands a sitemap tree into leaf page URLs
    pub async fn expand(&self, root_url: &str, deadline: Option<Instant>) -> ExpansionReport {
        let options = ExpandOptions {
            max_sitemap_depth: self.options.max_sitemap_depth,
            deadline,
        };
        expand(
            root_url,
            self.fetcher.clone(),
            self.parser.clone(),
            &options,
        )
        .await
    }

    /// Scrapes a list of page URLs under the configured concurrency cap
    pub async fn scrape(&self, urls: Vec<String>, deadline: Option<Instant>) -> ScrapeReport {
        scrape(
            urls,
            self.fetcher.clone(),
            self.parser.clone(),
            self.options.concurrency,
            deadline,
        )
        .await
    }

    /// Runs both phases for `root_url`
    ///
    /// Never fails: per-URL errors are logged and show up only in the counts.
    pub async fn run(&self, root_url: &str) -> CrawlReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = self.options.crawl_timeout.map(|timeout| start + timeout);

        tracing::info!("Starting crawl of {}", root_url);

        let expansion = self.expand(root_url, deadline).await;
        let scrape = if expansion.timed_out {
            skipped_scrape(&expansion.leaf_urls)
        } else {
            self.scrape(expansion.leaf_urls, deadline).await
        };

        let report = CrawlReport {
            root_url: root_url.to_string(),
            records: scrape.records,
            expansion: expansion.stats,
            scrape: scrape.stats,
            timed_out: expansion.timed_out || scrape.timed_out,
            started_at,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} records from {} leaf URLs in {:?}{}",
            report.records.len(),
            report.expansion.leaf_urls,
            report.elapsed,
            if report.timed_out { " (timed out)" } else { "" }
        );

        report
    }
}

/// Scrape result for leaf URLs that never got a chance to run
fn skipped_scrape(leaf_urls: &[String]) -> ScrapeReport {
    let empty = leaf_urls.iter().filter(|url| url.is_empty()).count();
    let pending = leaf_urls.len() - empty;
    tracing::warn!(
        "Crawl deadline passed during sitemap expansion, skipping {} pages",
        pending
    );

    ScrapeReport {
        records: Vec::new(),
        stats: ScrapeStats {
            attempted: pending,
            skipped_empty: empty,
            abandoned: pending,
            ..ScrapeStats::default()
        },
        timed_out: true,
    }
}

/// A finished crawl together with the result of exporting it
///
/// Export failures never discard the report.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub report: CrawlReport,
    /// `Err` with the first failed output, after every output was tried
    pub export: Result<(), SiftError>,
}

/// Runs a complete crawl from configuration
///
/// This function:
/// 1. Builds the HTTP fetcher and parser from the config
/// 2. Expands the root sitemap and scrapes every leaf page
/// 3. Stores records in SQLite when `database-path` is set
/// 4. Writes a markdown summary when `summary-path` is set
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished (possibly with per-URL or export failures)
/// * `Err(SiftError)` - The HTTP client could not be built
///
/// # Example
///
/// ```no_run
/// use sumi_sift::config::load_config_with_hash;
/// use sumi_sift::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("sift.toml"))?;
/// let outcome = run_crawl(&config, &hash).await?;
/// println!("{} pages scraped", outcome.report.records.len());
/// outcome.export?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, config_hash: &str) -> Result<CrawlOutcome, SiftError> {
    let coordinator = Coordinator::from_config(config)?;
    let report = coordinator.run(&config.crawler.root_url).await;
    let export = export_report(config, config_hash, &report);
    if let Err(e) = &export {
        tracing::error!("Export failed: {}", e);
    }
    Ok(CrawlOutcome { report, export })
}

/// Writes a report to every output the config enables
///
/// Every configured output is attempted; the first failure is returned.
pub fn export_report(
    config: &Config,
    config_hash: &str,
    report: &CrawlReport,
) -> Result<(), SiftError> {
    let database = match &config.output.database_path {
        Some(database_path) => export_database(Path::new(database_path), config_hash, report),
        None => Ok(()),
    };

    let summary = match &config.output.summary_path {
        Some(summary_path) => {
            tracing::info!("Writing summary to {}", summary_path);
            let summary = CrawlSummary::from_report(report, config_hash);
            generate_markdown_summary(&summary, Path::new(summary_path)).map_err(SiftError::from)
        }
        None => Ok(()),
    };

    database.and(summary)
}

fn export_database(
    database_path: &Path,
    config_hash: &str,
    report: &CrawlReport,
) -> Result<(), SiftError> {
    tracing::info!(
        "Exporting {} records to {}",
        report.records.len(),
        database_path.display()
    );
    let storage = SqliteStorage::new(database_path)?;
    let handler =
        SqliteOutputHandler::start(Arc::new(Mutex::new(storage)), &report.root_url, config_hash)?;
    handler.export(report)?;
    Ok(())
}
