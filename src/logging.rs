//! Log sink initialization
//!
//! The sink is built once from the validated logging configuration. When a
//! log file is configured, every line is mirrored to the console and the
//! file through a tee writer.

use crate::config::LoggingConfig;
use crate::error::{Result, TabsyncError};
use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

/// Writer that duplicates log output to stderr and a log file
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Initialize the process-wide log sink from configuration
///
/// `verbose` lowers the filter to debug regardless of the configured level.
/// RUST_LOG, when set, still takes precedence over both.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level: log::LevelFilter = config
        .level
        .parse()
        .map_err(|_| TabsyncError::config(format!("unknown log level '{}'", config.level)))?;
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        level
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(level.to_string()));

    match config.format.as_str() {
        "compact" => {
            builder.format_timestamp(None);
            builder.format_target(false);
        }
        _ => {
            builder.format_timestamp_secs();
        }
    }

    if let Some(path) = &config.file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(TeeWriter { file })));
    }

    // A second call in the same process keeps the first sink
    let _ = builder.try_init();
    Ok(())
}
