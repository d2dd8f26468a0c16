//! Error types for tabsync operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TabsyncError>;

#[derive(Error, Debug)]
pub enum TabsyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Created default configuration at {path}, review the settings and run again")]
    ConfigMissing { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Table '{table}' does not exist and auto-create is disabled")]
    TableMissing { table: String },

    #[error("Schema mismatch: {message}")]
    SchemaMismatch { message: String },

    #[error("Schema creation failed: {message}")]
    SchemaCreation { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl TabsyncError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: msg.into(),
        }
    }

    pub fn schema_creation(msg: impl Into<String>) -> Self {
        Self::SchemaCreation {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
