//! Configuration loading and validation
//!
//! All defaults are resolved once at load time so the rest of the code works
//! against a fully populated, validated struct.

use crate::error::{Result, TabsyncError};
use crate::infer::VARCHAR_MAX_LEN;
use crate::schema::is_valid_identifier;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub csv: CsvConfig,
    pub logging: LoggingConfig,
    pub monitoring: MonitoringConfig,
    pub data_types: DataTypesConfig,
}

/// Embedded store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./tabsync.db".to_string(),
        }
    }
}

/// Source file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Character encoding of source files (any WHATWG label, e.g. "utf-8")
    pub encoding: String,
    /// Field separator, exactly one character
    pub separator: String,
    /// Table used when no override is given on the command line
    pub default_table_name: String,
    /// Directory scanned for source files
    pub scan_directory: String,
    /// Wildcard pattern matched against file names in the scan directory
    pub file_pattern: String,
    /// Pick the newest matching file when no explicit file is given
    pub auto_find_latest: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            separator: ",".to_string(),
            default_table_name: "imported_data".to_string(),
            scan_directory: "./csv_files".to_string(),
            file_pattern: "*.csv".to_string(),
            auto_find_latest: true,
        }
    }
}

/// Log sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level: error, warn, info, debug or trace
    pub level: String,
    /// Line format: "full" (timestamp + level + target) or "compact"
    pub format: String,
    /// Optional log file mirrored alongside console output
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "full".to_string(),
            file: Some("tabsync.log".to_string()),
        }
    }
}

/// Continuous mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Seconds between polls of the source location
    pub check_interval: u64,
    /// Create the target table on first sync when it does not exist
    pub auto_create_table: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            check_interval: 60,
            auto_create_table: true,
        }
    }
}

/// Bounds applied during type inference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTypesConfig {
    /// Lower bound for inferred VARCHAR lengths
    pub varchar_length: usize,
    /// Total digits of inferred DECIMAL columns
    pub decimal_precision: u8,
    /// Fractional digits of inferred DECIMAL columns
    pub decimal_scale: u8,
}

impl Default for DataTypesConfig {
    fn default() -> Self {
        Self {
            varchar_length: 50,
            decimal_precision: 10,
            decimal_scale: 2,
        }
    }
}

impl Config {
    /// Load and validate the configuration file
    ///
    /// A missing file is written with defaults and reported as fatal so the
    /// operator can review the settings before the first real run.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            Config::default().write(path)?;
            return Err(TabsyncError::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject values the sync engine cannot work with
    pub fn validate(&self) -> Result<()> {
        self.separator_byte()?;

        if Encoding::for_label(self.csv.encoding.as_bytes()).is_none() {
            return Err(TabsyncError::config(format!(
                "unknown csv.encoding '{}'",
                self.csv.encoding
            )));
        }

        if !is_valid_identifier(&self.csv.default_table_name) {
            return Err(TabsyncError::config(format!(
                "csv.default_table_name '{}' is not a valid table identifier",
                self.csv.default_table_name
            )));
        }

        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(TabsyncError::config(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }

        if !matches!(self.logging.format.as_str(), "full" | "compact") {
            return Err(TabsyncError::config(format!(
                "logging.format must be 'full' or 'compact', got '{}'",
                self.logging.format
            )));
        }

        if self.monitoring.check_interval == 0 {
            return Err(TabsyncError::config(
                "monitoring.check_interval must be at least 1 second",
            ));
        }

        if self.data_types.varchar_length == 0 || self.data_types.varchar_length > VARCHAR_MAX_LEN {
            return Err(TabsyncError::config(format!(
                "data_types.varchar_length must be between 1 and {}",
                VARCHAR_MAX_LEN
            )));
        }

        if self.data_types.decimal_precision == 0 {
            return Err(TabsyncError::config(
                "data_types.decimal_precision must be positive",
            ));
        }

        if self.data_types.decimal_scale > self.data_types.decimal_precision {
            return Err(TabsyncError::config(format!(
                "data_types.decimal_scale ({}) cannot exceed decimal_precision ({})",
                self.data_types.decimal_scale, self.data_types.decimal_precision
            )));
        }

        Ok(())
    }

    /// The CSV field separator as a single byte
    pub fn separator_byte(&self) -> Result<u8> {
        let bytes = self.csv.separator.as_bytes();
        if bytes.len() != 1 {
            return Err(TabsyncError::config(format!(
                "csv.separator must be a single character, got '{}'",
                self.csv.separator
            )));
        }
        Ok(bytes[0])
    }
}
