//! Storage module for exporting crawl results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run tracking (timestamps, config hash, final counts)
//! - Persisting scraped page records

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::crawler::CrawlReport;

/// Represents a crawl run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub root_url: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub counts: RunCounts,
}

/// Final counts stored with a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub sitemaps_fetched: u64,
    pub sitemaps_failed: u64,
    pub leaf_urls: u64,
    pub pages_attempted: u64,
    pub pages_succeeded: u64,
    pub pages_failed: u64,
}

impl From<&CrawlReport> for RunCounts {
    fn from(report: &CrawlReport) -> Self {
        Self {
            sitemaps_fetched: report.expansion.sitemaps_fetched as u64,
            sitemaps_failed: report.expansion.sitemaps_failed as u64,
            leaf_urls: report.expansion.leaf_urls as u64,
            pages_attempted: report.scrape.attempted as u64,
            pages_succeeded: report.scrape.succeeded as u64,
            pages_failed: report.scrape.failed() as u64,
        }
    }
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    TimedOut,
    Failed,
}

impl RunStatus {
    /// Status a finished crawl report maps to
    pub fn for_report(report: &CrawlReport) -> Self {
        if report.timed_out {
            Self::TimedOut
        } else {
            Self::Completed
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "timed_out" => Some(Self::TimedOut),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
