//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::PageRecord;
use crate::storage::{RunCounts, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Stores finished crawl runs and the records they produced. Nothing here is
/// used to resume a crawl.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the `Running` state
    ///
    /// # Arguments
    ///
    /// * `root_url` - Root sitemap URL of the crawl
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, root_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recently created run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run finished and stores its final counts
    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
    ) -> StorageResult<()>;

    /// Counts stored runs
    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Records =====

    /// Stores one scraped page under a run
    ///
    /// # Returns
    ///
    /// The row ID of the stored record
    fn insert_record(&mut self, run_id: i64, record: &PageRecord) -> StorageResult<i64>;

    /// Stores a batch of records atomically: either all rows land or none
    fn insert_records(&mut self, run_id: i64, records: &[PageRecord]) -> StorageResult<()>;

    /// Loads all records of a run in insertion order
    fn load_records(&self, run_id: i64) -> StorageResult<Vec<PageRecord>>;

    /// Counts the records of a run
    fn count_records(&self, run_id: i64) -> StorageResult<u64>;
}
