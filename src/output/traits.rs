//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and
//! associated data structures for crawl summaries.

use crate::crawler::{CrawlReport, PageRecord};
use crate::storage::{RunRecord, RunStatus};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No crawl runs found in database")]
    NoRuns,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub run_id: Option<i64>,
    pub root_url: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,

    // Sitemap expansion
    pub sitemaps_fetched: u64,
    pub sitemaps_failed: u64,
    pub leaf_urls: u64,

    // Page scrape
    pub pages_attempted: u64,
    pub pages_succeeded: u64,
    pub pages_failed: u64,
    pub pages_abandoned: u64,

    // HTTP status code -> record count
    pub status_breakdown: BTreeMap<u16, u64>,

    // Records with an empty field
    pub missing_title: u64,
    pub missing_h1: u64,
    pub missing_description: u64,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a summary from a finished in-memory crawl
    pub fn from_report(report: &CrawlReport, config_hash: &str) -> Self {
        let finished_at = chrono::Duration::from_std(report.elapsed)
            .ok()
            .map(|elapsed| (report.started_at + elapsed).to_rfc3339());

        let mut summary = Self {
            run_id: None,
            root_url: report.root_url.clone(),
            started_at: report.started_at.to_rfc3339(),
            finished_at,
            duration_seconds: Some(report.elapsed.as_secs()),
            status: RunStatus::for_report(report).to_db_string().to_string(),
            config_hash: config_hash.to_string(),
            sitemaps_fetched: report.expansion.sitemaps_fetched as u64,
            sitemaps_failed: report.expansion.sitemaps_failed as u64,
            leaf_urls: report.expansion.leaf_urls as u64,
            pages_attempted: report.scrape.attempted as u64,
            pages_succeeded: report.scrape.succeeded as u64,
            pages_failed: report.scrape.failed() as u64,
            pages_abandoned: report.scrape.abandoned as u64,
            ..Self::default()
        };
        summary.tally_records(&report.records);
        summary
    }

    /// Builds a summary from a stored run and its records
    pub fn from_run(run: &RunRecord, records: &[PageRecord]) -> Self {
        let duration_seconds = match (
            run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
            run.finished_at
                .as_deref()
                .map(str::parse::<chrono::DateTime<chrono::Utc>>),
        ) {
            (Ok(started), Some(Ok(finished))) => Some((finished - started).num_seconds().max(0) as u64),
            _ => None,
        };

        let counts = &run.counts;
        let mut summary = Self {
            run_id: Some(run.id),
            root_url: run.root_url.clone(),
            started_at: run.started_at.clone(),
            finished_at: run.finished_at.clone(),
            duration_seconds,
            status: run.status.to_db_string().to_string(),
            config_hash: run.config_hash.clone(),
            sitemaps_fetched: counts.sitemaps_fetched,
            sitemaps_failed: counts.sitemaps_failed,
            leaf_urls: counts.leaf_urls,
            pages_attempted: counts.pages_attempted,
            pages_succeeded: counts.pages_succeeded,
            pages_failed: counts.pages_failed,
            pages_abandoned: counts
                .pages_attempted
                .saturating_sub(counts.pages_succeeded + counts.pages_failed),
            ..Self::default()
        };
        summary.tally_records(records);
        summary
    }

    fn tally_records(&mut self, records: &[PageRecord]) {
        for record in records {
            *self.status_breakdown.entry(record.status_code).or_insert(0) += 1;
            if record.title.is_empty() {
                self.missing_title += 1;
            }
            if record.h1.is_empty() {
                self.missing_h1 += 1;
            }
            if record.meta_description.is_empty() {
                self.missing_description += 1;
            }
        }
    }

    /// Number of records the summary was built from
    pub fn total_records(&self) -> u64 {
        self.status_breakdown.values().sum()
    }

    /// Returns the success rate as a percentage of attempted pages
    pub fn success_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        (self.pages_succeeded as f64 / self.pages_attempted as f64) * 100.0
    }

    /// Returns the error rate as a percentage of attempted pages
    pub fn error_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        (self.pages_failed as f64 / self.pages_attempted as f64) * 100.0
    }
}

/// Trait for output handlers
///
/// Output handlers receive the records of a finished crawl and then its
/// final report.
pub trait OutputHandler {
    /// Records one scraped page
    ///
    /// # Arguments
    ///
    /// * `record` - The scraped page metadata
    fn record_page(&self, record: &PageRecord) -> OutputResult<()>;

    /// Records a batch of scraped pages
    fn record_pages(&self, records: &[PageRecord]) -> OutputResult<()> {
        records.iter().try_for_each(|record| self.record_page(record))
    }

    /// Finalizes the output, performing any cleanup or final writes
    ///
    /// # Arguments
    ///
    /// * `report` - The finished crawl report
    fn finalize(&self, report: &CrawlReport) -> OutputResult<()>;
}
