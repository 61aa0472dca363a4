//! SQLite-based output handler implementation
//!
//! This module provides an output handler that exports crawl results
//! directly to the SQLite storage backend.

use crate::crawler::{CrawlReport, PageRecord};
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use crate::storage::{RunCounts, RunStatus, Storage};
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-based output handler
///
/// Each handler owns one run row. Records are written in a single
/// transaction and the run is closed with its final counts by `finalize`, or
/// as `Failed` when the records could not be stored.
pub struct SqliteOutputHandler {
    storage: Arc<Mutex<dyn Storage>>,
    run_id: i64,
}

impl SqliteOutputHandler {
    /// Creates a new SQLite output handler for an existing run
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: Arc<Mutex<dyn Storage>>, run_id: i64) -> Self {
        Self { storage, run_id }
    }

    /// Creates a run row and a handler writing to it
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `root_url` - Root sitemap URL of the crawl
    /// * `config_hash` - Hash of the configuration
    pub fn start(
        storage: Arc<Mutex<dyn Storage>>,
        root_url: &str,
        config_hash: &str,
    ) -> OutputResult<Self> {
        let run_id = lock(&storage)?
            .create_run(root_url, config_hash)
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        tracing::debug!("Created run {} for {}", run_id, root_url);
        Ok(Self::new(storage, run_id))
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Stores every record of `report` and closes the run
    ///
    /// A run whose records cannot be stored is closed as `Failed` and the
    /// storage error is returned.
    pub fn export(&self, report: &CrawlReport) -> OutputResult<()> {
        if let Err(e) = self.record_pages(&report.records) {
            tracing::error!("Failed to store records of run {}: {}", self.run_id, e);
            self.close(report, RunStatus::Failed)?;
            return Err(e);
        }
        self.finalize(report)
    }

    fn close(&self, report: &CrawlReport, status: RunStatus) -> OutputResult<()> {
        lock(&self.storage)?
            .complete_run(self.run_id, status, &RunCounts::from(report))
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        tracing::debug!(
            "Run {} finalized as {}",
            self.run_id,
            status.to_db_string()
        );
        Ok(())
    }
}

fn lock(storage: &Arc<Mutex<dyn Storage>>) -> OutputResult<MutexGuard<'_, dyn Storage + 'static>> {
    storage
        .lock()
        .map_err(|e| OutputError::Storage(format!("Failed to lock storage: {}", e)))
}

impl OutputHandler for SqliteOutputHandler {
    fn record_page(&self, record: &PageRecord) -> OutputResult<()> {
        lock(&self.storage)?
            .insert_record(self.run_id, record)
            .map_err(|e| OutputError::Storage(e.to_string()))?;
        Ok(())
    }

    fn record_pages(&self, records: &[PageRecord]) -> OutputResult<()> {
        lock(&self.storage)?
            .insert_records(self.run_id, records)
            .map_err(|e| OutputError::Storage(e.to_string()))
    }

    fn finalize(&self, report: &CrawlReport) -> OutputResult<()> {
        self.close(report, RunStatus::for_report(report))
    }
}
