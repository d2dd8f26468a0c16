//! Common test utilities and helpers

use std::fs;
use std::path::{Path, PathBuf};
use tabsync::config::Config;
use tabsync::data::CsvSource;
use tabsync::infer::TypeInferencer;
use tabsync::progress::ProgressReporter;
use tabsync::schema::SchemaBuilder;
use tabsync::store::Store;
use tabsync::sync::{SyncEngine, SyncOptions, SyncReport};
use tabsync::Result;
use tempfile::TempDir;

/// Test fixture managing a temporary directory, config and database
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub config: Config,
}

impl TestFixture {
    /// Create a fixture whose database and scan directory live in a tempdir
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let mut config = Config::default();
        config.database.path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        config.csv.scan_directory = temp_dir
            .path()
            .join("csv_files")
            .to_string_lossy()
            .to_string();
        config.logging.file = None;

        Ok(Self { temp_dir, config })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a CSV file with raw string content
    pub fn create_csv(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Open the fixture database
    pub fn open_store(&self) -> Result<Store> {
        Store::open(Path::new(&self.config.database.path))
    }

    /// Source over a fixture file with default settings
    pub fn csv_source(&self, path: &Path) -> Result<CsvSource> {
        CsvSource::new(path, b',', "utf-8")
    }

    /// Default engine options for a target table
    pub fn sync_options(&self, table: &str) -> SyncOptions {
        SyncOptions {
            table: table.to_string(),
            batch_size: tabsync::DEFAULT_BATCH_SIZE,
            auto_create_table: true,
            sample_rows: tabsync::DEFAULT_SAMPLE_ROWS,
        }
    }

    /// Run one sync pass with a fresh store connection, like separate
    /// process invocations would
    pub fn run_sync(&self, file: &Path, table: &str) -> Result<SyncReport> {
        let mut store = self.open_store()?;
        let source = self.csv_source(file)?;
        let mut engine = SyncEngine::new(
            &mut store,
            SchemaBuilder::new(TypeInferencer::default()),
            self.sync_options(table),
        );
        engine.sync(&source, &mut ProgressReporter::new_minimal())
    }
}

/// CSV body with a header and `rows` numbered data rows
pub fn numbered_csv(rows: usize) -> String {
    let mut content = String::from("id,name,amount\n");
    for i in 1..=rows {
        content.push_str(&format!("{},person_{},{}.50\n", i, i, i));
    }
    content
}
