//! Output formatting utilities

use crate::error::Result;
use crate::store::TableSummary;
use crate::sync::{StatusReport, SyncReport};

/// Pretty printer for command output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a sync pass summary
    pub fn print_sync_report(report: &SyncReport) {
        println!(
            "📦 Synced {} → table '{}'",
            report.source.display(),
            report.table
        );
        if report.table_created {
            println!("├─ Created table '{}'", report.table);
        }
        println!("├─ Rows read: {}", report.rows_read);
        println!("├─ Inserted: {}", report.rows_inserted);
        if report.rows_failed > 0 {
            println!("├─ Failed: {}", report.rows_failed);
        }
        println!("└─ Already present: {}", report.rows_skipped);
    }

    /// Print status check results
    pub fn print_status_report(report: &StatusReport, quiet: bool) {
        if quiet {
            // Machine-readable output
            println!("table_exists={}", report.table_exists);
            println!("rows_total={}", report.rows_total);
            println!("rows_new={}", report.rows_new);
            println!("rows_existing={}", report.rows_existing);
            return;
        }

        println!(
            "📊 Status of {} against table '{}'",
            report.source.display(),
            report.table
        );
        if !report.table_exists {
            println!("├─ Table does not exist yet, a sync would create it");
        }
        println!("├─ Rows in file: {}", report.rows_total);
        println!("├─ New: {}", report.rows_new);
        println!("└─ Already present: {}", report.rows_existing);
    }

    /// Print the target table summary
    pub fn print_table_summary(summary: &TableSummary) {
        if !summary.exists {
            println!("Table '{}' does not exist.", summary.table);
            return;
        }

        println!("📋 Table '{}'", summary.table);
        println!("├─ Rows: {}", summary.row_count);
        match &summary.last_imported_at {
            Some(at) => println!("└─ Last import: {}", at),
            None => println!("└─ Last import: never"),
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn print_sync_report(report: &SyncReport) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }

    pub fn print_status_report(report: &StatusReport) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }

    pub fn print_table_summary(summary: &TableSummary) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(summary)?);
        Ok(())
    }
}
