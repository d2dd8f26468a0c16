//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter handed into the sync engine
///
/// Interactive runs get a spinner for the fingerprint load and a running
/// row counter; quiet and JSON modes use the silent variant.
#[derive(Debug)]
pub struct ProgressReporter {
    hashes_pb: Option<ProgressBar>,
    rows_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Reporter for an interactive sync pass
    pub fn new_for_sync() -> Self {
        Self {
            hashes_pb: Some(create_spinner("Loading stored fingerprints...")),
            rows_pb: None,
            show_progress: true,
        }
    }

    /// Reporter that stays silent
    pub fn new_minimal() -> Self {
        Self {
            hashes_pb: None,
            rows_pb: None,
            show_progress: false,
        }
    }

    fn ensure_rows_pb(&mut self) {
        if self.show_progress && self.rows_pb.is_none() {
            self.rows_pb = Some(create_row_counter("Scanning rows"));
        }
    }

    /// Finish the fingerprint-loading stage
    pub fn finish_hashes(&mut self, message: &str) {
        if let Some(pb) = self.hashes_pb.take() {
            pb.finish_with_message(message.to_string());
        }
        self.ensure_rows_pb();
    }

    /// Update the scanned-row counter
    pub fn update_rows(&mut self, processed: u64) {
        self.ensure_rows_pb();
        if let Some(pb) = &self.rows_pb {
            pb.set_position(processed);
        }
    }

    /// Finish row processing
    pub fn finish_rows(&mut self, message: &str) {
        if let Some(pb) = self.rows_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Clean up silently if the pass ended early
        if let Some(pb) = self.hashes_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.rows_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a spinner with a running row count
fn create_row_counter(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}: {pos} rows")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
