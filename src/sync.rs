//! The incremental sync engine
//!
//! Orchestrates schema creation, fingerprint loading, row scanning and
//! batched writes for one source file against one target table.

use crate::data::{CsvPreview, CsvSource};
use crate::error::{Result, TabsyncError};
use crate::hash::RowFingerprinter;
use crate::progress::ProgressReporter;
use crate::schema::SchemaBuilder;
use crate::store::Store;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

/// Engine progression for one sync pass. Failed absorbs any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    SchemaEnsuring,
    HashesLoading,
    RowsScanning,
    RowsWriting,
    Done,
    Failed,
}

/// Tunables for a sync pass
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub table: String,
    pub batch_size: usize,
    pub auto_create_table: bool,
    pub sample_rows: usize,
}

/// Summary of one completed sync pass
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub source: PathBuf,
    pub table: String,
    pub table_created: bool,
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
    pub rows_failed: usize,
    pub duration_ms: u128,
}

/// Read-only counterpart of a sync pass
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub source: PathBuf,
    pub table: String,
    pub table_exists: bool,
    pub rows_total: usize,
    pub rows_new: usize,
    pub rows_existing: usize,
}

/// Orchestrates one sync pass end to end
pub struct SyncEngine<'a> {
    store: &'a mut Store,
    builder: SchemaBuilder,
    fingerprinter: RowFingerprinter,
    options: SyncOptions,
    phase: SyncPhase,
}

impl<'a> SyncEngine<'a> {
    pub fn new(store: &'a mut Store, builder: SchemaBuilder, options: SyncOptions) -> Self {
        Self {
            store,
            builder,
            fingerprinter: RowFingerprinter::new(),
            options,
            phase: SyncPhase::Idle,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    fn enter(&mut self, phase: SyncPhase) {
        log::debug!("sync phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Run one full sync pass over the given source
    pub fn sync(&mut self, source: &CsvSource, progress: &mut ProgressReporter) -> Result<SyncReport> {
        match self.run(source, progress) {
            Ok(report) => {
                self.enter(SyncPhase::Done);
                log::info!(
                    "sync of {} into '{}' done: {} inserted, {} already present, {} failed ({} ms)",
                    report.source.display(),
                    report.table,
                    report.rows_inserted,
                    report.rows_skipped,
                    report.rows_failed,
                    report.duration_ms
                );
                Ok(report)
            }
            Err(e) => {
                self.enter(SyncPhase::Failed);
                Err(e)
            }
        }
    }

    fn run(&mut self, source: &CsvSource, progress: &mut ProgressReporter) -> Result<SyncReport> {
        let started = Instant::now();

        self.enter(SyncPhase::SchemaEnsuring);
        let preview = source.preview(self.options.sample_rows)?;
        check_headers(source, &preview)?;
        let (column_names, table_created) = self.ensure_schema(&preview)?;

        self.enter(SyncPhase::HashesLoading);
        let mut seen = self.store.load_fingerprints(&self.options.table)?;
        log::info!(
            "loaded {} stored fingerprints from '{}'",
            seen.len(),
            self.options.table
        );
        progress.finish_hashes(&format!("{} stored fingerprints", seen.len()));

        self.enter(SyncPhase::RowsScanning);
        let mut report = SyncReport {
            source: source.path().to_path_buf(),
            table: self.options.table.clone(),
            table_created,
            rows_read: 0,
            rows_inserted: 0,
            rows_skipped: 0,
            rows_failed: 0,
            duration_ms: 0,
        };

        let mut pending: Vec<(Vec<String>, String)> = Vec::with_capacity(self.options.batch_size);
        let mut rows = source.rows(column_names.len())?;
        while let Some(row) = rows.next_row()? {
            report.rows_read += 1;
            progress.update_rows(report.rows_read as u64);

            let fingerprint = self.fingerprinter.fingerprint(&row);
            // Also absorbs duplicates within the file itself
            if !seen.insert(fingerprint.clone()) {
                report.rows_skipped += 1;
                continue;
            }

            pending.push((row, fingerprint));
            if pending.len() >= self.options.batch_size {
                self.flush(&column_names, &mut pending, &mut report)?;
            }
        }

        self.enter(SyncPhase::RowsWriting);
        self.flush(&column_names, &mut pending, &mut report)?;
        progress.finish_rows(&format!(
            "{} rows scanned, {} inserted",
            report.rows_read, report.rows_inserted
        ));

        report.duration_ms = started.elapsed().as_millis();
        Ok(report)
    }

    /// Count how many rows of the source are not yet stored, without writing
    pub fn preview(&mut self, source: &CsvSource) -> Result<StatusReport> {
        let preview = source.preview(self.options.sample_rows)?;
        check_headers(source, &preview)?;

        let column_names = SchemaBuilder::column_names(&preview.headers);
        let table_exists = self.store.table_exists(&self.options.table)?;
        let mut seen: HashSet<String> = self.store.load_fingerprints(&self.options.table)?;

        let mut report = StatusReport {
            source: source.path().to_path_buf(),
            table: self.options.table.clone(),
            table_exists,
            rows_total: 0,
            rows_new: 0,
            rows_existing: 0,
        };

        let mut rows = source.rows(column_names.len())?;
        while let Some(row) = rows.next_row()? {
            report.rows_total += 1;
            let fingerprint = self.fingerprinter.fingerprint(&row);
            if seen.insert(fingerprint) {
                report.rows_new += 1;
            } else {
                report.rows_existing += 1;
            }
        }

        Ok(report)
    }

    /// Make sure the target table exists and matches the source columns
    ///
    /// An existing table whose data columns differ from the file's headers
    /// fails the run rather than silently writing into the wrong shape.
    fn ensure_schema(&mut self, preview: &CsvPreview) -> Result<(Vec<String>, bool)> {
        let table = self.options.table.clone();

        if self.store.table_exists(&table)? {
            let existing = self.store.table_columns(&table)?;
            let incoming = SchemaBuilder::column_names(&preview.headers);
            if existing != incoming {
                return Err(TabsyncError::schema_mismatch(format!(
                    "table '{}' has columns [{}] but the source provides [{}]",
                    table,
                    existing.join(", "),
                    incoming.join(", ")
                )));
            }
            return Ok((incoming, false));
        }

        if !self.options.auto_create_table {
            return Err(TabsyncError::TableMissing { table });
        }

        let spec = self
            .builder
            .build(&table, &preview.headers, &preview.sample_rows);
        self.store.ensure_table(&spec)?;
        log::info!(
            "created table '{}' with {} data columns",
            table,
            spec.columns.len()
        );
        Ok((spec.column_names(), true))
    }

    fn flush(
        &mut self,
        columns: &[String],
        pending: &mut Vec<(Vec<String>, String)>,
        report: &mut SyncReport,
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }

        let outcome =
            self.store
                .insert_ignoring_duplicates(&self.options.table, columns, pending)?;
        report.rows_inserted += outcome.inserted;
        report.rows_skipped += outcome.duplicates;
        report.rows_failed += outcome.failed;
        pending.clear();

        log::info!(
            "{} rows imported into '{}' so far",
            report.rows_inserted,
            self.options.table
        );
        Ok(())
    }
}

fn check_headers(source: &CsvSource, preview: &CsvPreview) -> Result<()> {
    if preview.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TabsyncError::invalid_input(format!(
            "source file {} has no usable header row",
            source.path().display()
        )));
    }
    Ok(())
}
