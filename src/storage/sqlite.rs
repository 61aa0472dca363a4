//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::PageRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunCounts, RunRecord, RunStatus};
use crate::SiftError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, root_url, started_at, finished_at, config_hash, status, \
     sitemaps_fetched, sitemaps_failed, leaf_urls, pages_attempted, pages_succeeded, pages_failed";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SiftError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SiftError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SiftError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Maps a `runs` row selected with `RUN_COLUMNS`
fn run_from_row(row: &Row<'_>) -> rusqlite::Result<(RunRecord, String)> {
    let status: String = row.get(5)?;
    let run = RunRecord {
        id: row.get(0)?,
        root_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::Running,
        counts: RunCounts {
            sitemaps_fetched: row.get::<_, i64>(6)? as u64,
            sitemaps_failed: row.get::<_, i64>(7)? as u64,
            leaf_urls: row.get::<_, i64>(8)? as u64,
            pages_attempted: row.get::<_, i64>(9)? as u64,
            pages_succeeded: row.get::<_, i64>(10)? as u64,
            pages_failed: row.get::<_, i64>(11)? as u64,
        },
    };
    Ok((run, status))
}

/// Resolves the status column read alongside a run
fn with_status((mut run, status): (RunRecord, String)) -> StorageResult<RunRecord> {
    run.status = RunStatus::from_db_string(&status)
        .ok_or_else(|| StorageError::InvalidValue(format!("unknown run status '{}'", status)))?;
    Ok(run)
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, root_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (root_url, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![root_url, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))?;

        with_status(row)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        row.map(with_status).transpose()
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2,
                sitemaps_fetched = ?3, sitemaps_failed = ?4, leaf_urls = ?5,
                pages_attempted = ?6, pages_succeeded = ?7, pages_failed = ?8
             WHERE id = ?9",
            params![
                status.to_db_string(),
                now,
                counts.sitemaps_fetched as i64,
                counts.sitemaps_failed as i64,
                counts.leaf_urls as i64,
                counts.pages_attempted as i64,
                counts.pages_succeeded as i64,
                counts.pages_failed as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Records =====

    fn insert_record(&mut self, run_id: i64, record: &PageRecord) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO pages (run_id, url, title, h1, meta_description, status_code, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id,
                record.url,
                record.title,
                record.h1,
                record.meta_description,
                record.status_code,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_records(&mut self, run_id: i64, records: &[PageRecord]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO pages (run_id, url, title, h1, meta_description, status_code, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for record in records {
                stmt.execute(params![
                    run_id,
                    record.url,
                    record.title,
                    record.h1,
                    record.meta_description,
                    record.status_code,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_records(&self, run_id: i64) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, title, h1, meta_description, status_code FROM pages
             WHERE run_id = ?1 ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![run_id], |row| {
                Ok(PageRecord {
                    url: row.get(0)?,
                    title: row.get(1)?,
                    h1: row.get(2)?,
                    meta_description: row.get(3)?,
                    status_code: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn count_records(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
