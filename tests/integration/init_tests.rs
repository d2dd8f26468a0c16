//! Tests for configuration bootstrap and the init command

use crate::common::TestFixture;
use tabsync::cli::{Cli, Commands};
use tabsync::commands::execute_command;
use tabsync::config::Config;
use tabsync::TabsyncError;

fn init_cli(config: std::path::PathBuf, force: bool) -> Cli {
    Cli {
        command: Commands::Init { force },
        config,
        verbose: false,
    }
}

#[test]
fn test_missing_config_is_written_and_fatal() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.root().join("config.json");

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, TabsyncError::ConfigMissing { .. }));

    // The operator reviews the generated file and the next run succeeds
    assert!(path.exists());
    let config = Config::load(&path).unwrap();
    assert_eq!(config.csv.default_table_name, "imported_data");
}

#[test]
fn test_init_writes_default_config() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.root().join("config.json");

    execute_command(init_cli(path.clone(), false)).unwrap();

    assert!(path.exists());
    let config = Config::load(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.csv.file_pattern, "*.csv");
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.root().join("config.json");

    execute_command(init_cli(path.clone(), false)).unwrap();
    let err = execute_command(init_cli(path.clone(), false)).unwrap_err();
    assert!(matches!(err, TabsyncError::InvalidInput { .. }));

    // Forcing rewrites the file
    execute_command(init_cli(path, true)).unwrap();
}
