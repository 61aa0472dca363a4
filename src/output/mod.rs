//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Exporting scraped records through output handlers
//! - Generating markdown summaries of crawl results
//! - Printing records and statistics to the console

mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use sqlite_output::SqliteOutputHandler;
pub use stats::{format_record, print_records, print_statistics};
pub use traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};

use crate::storage::Storage;

/// Generates a crawl summary for the most recent stored run
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl data
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Successfully generated summary
/// * `Err(OutputError)` - No runs stored, or the query failed
pub fn generate_summary(storage: &dyn Storage) -> OutputResult<CrawlSummary> {
    let run = storage
        .get_latest_run()
        .map_err(|e| OutputError::Storage(e.to_string()))?
        .ok_or(OutputError::NoRuns)?;

    let records = storage
        .load_records(run.id)
        .map_err(|e| OutputError::Storage(e.to_string()))?;

    Ok(CrawlSummary::from_run(&run, &records))
}
