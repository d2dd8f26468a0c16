//! Polling watch loop
//!
//! Cooperative single-threaded loop: one sync at a time, the loop blocks
//! during each pass and sleeps between polls.

use crate::error::{Result, TabsyncError};
use crate::resolver::{ResolvedSource, SourceResolver};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Re-syncs whenever the resolved source file changes
pub struct WatchLoop {
    resolver: SourceResolver,
    interval: Duration,
    running: Arc<AtomicBool>,
    last_path: Option<PathBuf>,
    last_modified: Option<SystemTime>,
}

impl WatchLoop {
    pub fn new(resolver: SourceResolver, interval: Duration) -> Self {
        Self {
            resolver,
            interval,
            running: Arc::new(AtomicBool::new(true)),
            last_path: None,
            last_modified: None,
        }
    }

    /// Flag that stops the loop when flipped to false
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Whether a resolved source warrants a new pass: the path differs from
    /// the last processed file, or its modification time advanced
    pub fn should_sync(&self, resolved: &ResolvedSource) -> bool {
        match (&self.last_path, self.last_modified) {
            (Some(path), Some(modified)) => {
                resolved.path != *path || resolved.modified > modified
            }
            _ => true,
        }
    }

    fn mark_processed(&mut self, resolved: &ResolvedSource) {
        self.last_path = Some(resolved.path.clone());
        self.last_modified = Some(resolved.modified);
    }

    /// Run until interrupted, invoking `sync_pass` for each changed source
    ///
    /// A failed pass is logged and retried on the next poll; the file is
    /// only marked processed after a successful pass.
    pub fn run<F>(&mut self, mut sync_pass: F) -> Result<()>
    where
        F: FnMut(&ResolvedSource) -> Result<()>,
    {
        log::info!(
            "watching for source changes every {}s",
            self.interval.as_secs()
        );

        while self.running.load(Ordering::SeqCst) {
            match self.resolver.resolve(None)? {
                Some(resolved) => {
                    if self.should_sync(&resolved) {
                        match sync_pass(&resolved) {
                            Ok(()) => self.mark_processed(&resolved),
                            Err(e) => log::error!("sync pass failed: {}", e),
                        }
                    } else {
                        log::debug!("source unchanged, skipping");
                    }
                }
                None => log::debug!("no source file available"),
            }
            self.sleep();
        }

        log::info!("watch loop interrupted, exiting");
        Ok(())
    }

    // Sleep in short slices so an interrupt is honored promptly
    fn sleep(&self) {
        let slice = Duration::from_millis(250);
        let mut remaining = self.interval;
        while !remaining.is_zero() && self.running.load(Ordering::SeqCst) {
            let step = remaining.min(slice);
            std::thread::sleep(step);
            remaining -= step;
        }
    }
}

/// Install a Ctrl-C handler that flips `running` to false
pub fn install_interrupt_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("interrupt received, finishing current pass");
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|e| {
        TabsyncError::Generic(anyhow::anyhow!("failed to install interrupt handler: {}", e))
    })
}
