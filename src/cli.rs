//! Command-line interface for tabsync

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabsync")]
#[command(about = "Incremental CSV to SQLite sync with automatic schema inference")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = crate::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Run one sync pass and exit
    Sync {
        /// Source file; defaults to the newest match in the scan directory
        file: Option<PathBuf>,

        /// Target table; defaults to csv.default_table_name
        #[arg(long)]
        table: Option<String>,

        /// Rows per write batch (must be > 0)
        #[arg(long, default_value_t = crate::DEFAULT_BATCH_SIZE, value_parser = validate_batch_size)]
        batch_size: usize,

        /// Output the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Poll the source location and sync whenever it changes
    Watch {
        /// Seconds between polls; defaults to monitoring.check_interval
        #[arg(long)]
        interval: Option<u64>,

        /// Target table; defaults to csv.default_table_name
        #[arg(long)]
        table: Option<String>,

        /// Rows per write batch (must be > 0)
        #[arg(long, default_value_t = crate::DEFAULT_BATCH_SIZE, value_parser = validate_batch_size)]
        batch_size: usize,
    },

    /// Report how many rows of the current source are not yet stored
    Status {
        /// Source file; defaults to the newest match in the scan directory
        file: Option<PathBuf>,

        /// Target table; defaults to csv.default_table_name
        #[arg(long)]
        table: Option<String>,

        /// Quiet output (machine-readable)
        #[arg(long)]
        quiet: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a summary of the target table
    Show {
        /// Target table; defaults to csv.default_table_name
        #[arg(long)]
        table: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Validate that batch size is greater than 0
fn validate_batch_size(s: &str) -> Result<usize, String> {
    let batch_size: usize = s
        .parse()
        .map_err(|_| format!("Invalid batch size: '{}'. Must be a positive integer.", s))?;

    if batch_size == 0 {
        return Err("Batch size must be greater than 0".to_string());
    }

    Ok(batch_size)
}
