//! Embedded SQLite store access
//!
//! Parameterized statements for all values; identifiers are quoted and come
//! from sanitized schema names only. One transaction per batch write.

use crate::error::{Result, TabsyncError};
use crate::schema::{self, TableSpec, FINGERPRINT_COLUMN, IMPORTED_AT_COLUMN};
use rusqlite::{params, params_from_iter, Connection};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Outcome of one batch write
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchOutcome {
    /// Rows actually written
    pub inserted: usize,
    /// Rows skipped because their fingerprint was already stored
    pub duplicates: usize,
    /// Rows skipped for unrelated per-row failures
    pub failed: usize,
}

/// Summary of a table for the show command
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub exists: bool,
    pub row_count: i64,
    pub last_imported_at: Option<String>,
}

/// Connection wrapper exposing the operations the sync engine needs
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database file, creating parent directories when needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        // Other instances may write concurrently; wait instead of failing
        conn.busy_timeout(Duration::from_secs(5))?;
        log::info!("opened database {}", path.display());
        Ok(Self { conn })
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Idempotent table creation from a spec
    pub fn ensure_table(&self, spec: &TableSpec) -> Result<()> {
        let sql = spec.create_table_sql();
        log::debug!("ensuring table: {}", sql);
        self.conn.execute_batch(&sql).map_err(|e| {
            TabsyncError::schema_creation(format!("table '{}': {}", spec.name, e))
        })?;
        Ok(())
    }

    /// Data column names of an existing table, excluding system columns
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let names: std::result::Result<Vec<String>, _> = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect();

        Ok(names?
            .into_iter()
            .filter(|name| !schema::is_system_column(name))
            .collect())
    }

    /// Full set of fingerprints currently stored for a table
    ///
    /// A missing table reads as the empty set so a first sync proceeds
    /// straight into the initial import.
    pub fn load_fingerprints(&self, table: &str) -> Result<HashSet<String>> {
        if !self.table_exists(table)? {
            return Ok(HashSet::new());
        }

        let sql = format!("SELECT \"{}\" FROM \"{}\"", FINGERPRINT_COLUMN, table);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut fingerprints = HashSet::new();
        for fingerprint in rows {
            fingerprints.insert(fingerprint?);
        }
        Ok(fingerprints)
    }

    /// Write a batch of rows inside one transaction, letting the store skip
    /// rows whose fingerprint is already present
    ///
    /// The duplicate check happens in the store itself, so a fingerprint
    /// inserted by another instance between our hash load and this call is
    /// skipped instead of failing the batch. Other per-row failures are
    /// logged and skipped without aborting the batch.
    pub fn insert_ignoring_duplicates(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[(Vec<String>, String)],
    ) -> Result<BatchOutcome> {
        let column_list: Vec<String> = columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .chain(std::iter::once(format!("\"{}\"", FINGERPRINT_COLUMN)))
            .collect();
        let placeholders: Vec<String> = (1..=column_list.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT OR IGNORE INTO \"{}\" ({}) VALUES ({})",
            table,
            column_list.join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        let mut outcome = BatchOutcome::default();
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for (values, fingerprint) in rows {
                let fields = values
                    .iter()
                    .map(|v| v.as_str())
                    .chain(std::iter::once(fingerprint.as_str()));
                match stmt.execute(params_from_iter(fields)) {
                    // Zero changed rows means the unique constraint matched
                    Ok(0) => outcome.duplicates += 1,
                    Ok(_) => outcome.inserted += 1,
                    Err(e) => {
                        log::warn!("row insert failed, skipping: {}", e);
                        outcome.failed += 1;
                    }
                }
            }
        }
        tx.commit()?;

        Ok(outcome)
    }

    /// Total rows currently stored in a table
    pub fn row_count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Summary used by the show command
    pub fn table_summary(&self, table: &str) -> Result<TableSummary> {
        if !self.table_exists(table)? {
            return Ok(TableSummary {
                table: table.to_string(),
                exists: false,
                row_count: 0,
                last_imported_at: None,
            });
        }

        let row_count = self.row_count(table)?;
        let sql = format!(
            "SELECT MAX(\"{}\") FROM \"{}\"",
            IMPORTED_AT_COLUMN, table
        );
        let last_imported_at: Option<String> = self.conn.query_row(&sql, [], |row| row.get(0))?;

        Ok(TableSummary {
            table: table.to_string(),
            exists: true,
            row_count,
            last_imported_at,
        })
    }
}
