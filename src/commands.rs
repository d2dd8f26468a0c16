//! Command implementations for the tabsync CLI

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::data::CsvSource;
use crate::error::{Result, TabsyncError};
use crate::infer::TypeInferencer;
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::resolver::{ResolvedSource, SourceResolver};
use crate::schema::{is_valid_identifier, SchemaBuilder};
use crate::store::Store;
use crate::sync::{SyncEngine, SyncOptions};
use crate::watch::{self, WatchLoop};
use std::path::Path;
use std::time::Duration;

/// Execute the parsed command line
pub fn execute_command(cli: Cli) -> Result<()> {
    // Init runs before any configuration exists
    if let Commands::Init { force } = cli.command {
        return init_command(&cli.config, force);
    }

    let config = Config::load(&cli.config)?;
    crate::logging::init(&config.logging, cli.verbose)?;
    log::info!("configuration loaded from {}", cli.config.display());

    match cli.command {
        Commands::Sync {
            file,
            table,
            batch_size,
            json,
        } => sync_command(&config, file.as_deref(), table, batch_size, json),
        Commands::Watch {
            interval,
            table,
            batch_size,
        } => watch_command(&config, interval, table, batch_size),
        Commands::Status {
            file,
            table,
            quiet,
            json,
        } => status_command(&config, file.as_deref(), table, quiet, json),
        Commands::Show { table, json } => show_command(&config, table, json),
        Commands::Init { .. } => unreachable!("handled above"),
    }
}

/// Write a default configuration file
fn init_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(TabsyncError::invalid_input(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }

    Config::default().write(path)?;
    println!("✅ Wrote default configuration to {}", path.display());
    println!("   Review the settings, then run 'tabsync sync' or 'tabsync watch'.");
    Ok(())
}

/// Run one sync pass
fn sync_command(
    config: &Config,
    file: Option<&Path>,
    table: Option<String>,
    batch_size: usize,
    json: bool,
) -> Result<()> {
    let table = resolve_table(config, table)?;
    let resolved = match resolve_source(config, file)? {
        Some(resolved) => resolved,
        None => {
            log::warn!("no source file found, nothing to sync");
            return Ok(());
        }
    };

    let source = csv_source(config, &resolved.path)?;
    let mut store = Store::open(Path::new(&config.database.path))?;
    let mut engine = SyncEngine::new(
        &mut store,
        schema_builder(config),
        sync_options(config, table, batch_size),
    );

    let mut progress = if json {
        ProgressReporter::new_minimal()
    } else {
        ProgressReporter::new_for_sync()
    };
    let report = engine.sync(&source, &mut progress)?;
    drop(progress);

    if json {
        JsonFormatter::print_sync_report(&report)?;
    } else {
        PrettyPrinter::print_sync_report(&report);
    }
    Ok(())
}

/// Poll the source location and sync on every change
fn watch_command(
    config: &Config,
    interval: Option<u64>,
    table: Option<String>,
    batch_size: usize,
) -> Result<()> {
    let table = resolve_table(config, table)?;
    let interval = Duration::from_secs(interval.unwrap_or(config.monitoring.check_interval));

    let mut store = Store::open(Path::new(&config.database.path))?;
    let mut watch_loop = WatchLoop::new(source_resolver(config), interval);
    watch::install_interrupt_handler(watch_loop.stop_handle())?;

    watch_loop.run(|resolved| {
        let source = csv_source(config, &resolved.path)?;
        let mut engine = SyncEngine::new(
            &mut store,
            schema_builder(config),
            sync_options(config, table.clone(), batch_size),
        );
        let report = engine.sync(&source, &mut ProgressReporter::new_minimal())?;
        log::info!(
            "watch pass complete: {} new rows from {}",
            report.rows_inserted,
            resolved.path.display()
        );
        Ok(())
    })
}

/// Report how many rows of the current source are not yet stored
fn status_command(
    config: &Config,
    file: Option<&Path>,
    table: Option<String>,
    quiet: bool,
    json: bool,
) -> Result<()> {
    let table = resolve_table(config, table)?;
    let resolved = match resolve_source(config, file)? {
        Some(resolved) => resolved,
        None => {
            log::warn!("no source file found");
            return Ok(());
        }
    };

    let source = csv_source(config, &resolved.path)?;
    let mut store = Store::open(Path::new(&config.database.path))?;
    let mut engine = SyncEngine::new(
        &mut store,
        schema_builder(config),
        sync_options(config, table, crate::DEFAULT_BATCH_SIZE),
    );
    let report = engine.preview(&source)?;

    if json {
        JsonFormatter::print_status_report(&report)?;
    } else {
        PrettyPrinter::print_status_report(&report, quiet);
    }
    Ok(())
}

/// Show a summary of the target table
fn show_command(config: &Config, table: Option<String>, json: bool) -> Result<()> {
    let table = resolve_table(config, table)?;
    let store = Store::open(Path::new(&config.database.path))?;
    let summary = store.table_summary(&table)?;

    if json {
        JsonFormatter::print_table_summary(&summary)?;
    } else {
        PrettyPrinter::print_table_summary(&summary);
    }
    Ok(())
}

/// Table from the CLI override or configuration, validated as an identifier
fn resolve_table(config: &Config, cli_override: Option<String>) -> Result<String> {
    let table = cli_override.unwrap_or_else(|| config.csv.default_table_name.clone());
    if !is_valid_identifier(&table) {
        return Err(TabsyncError::invalid_input(format!(
            "'{}' is not a valid table name",
            table
        )));
    }
    Ok(table)
}

fn resolve_source(config: &Config, file: Option<&Path>) -> Result<Option<ResolvedSource>> {
    let resolver = source_resolver(config);
    if file.is_some() {
        resolver.resolve(file)
    } else if config.csv.auto_find_latest {
        resolver.resolve(None)
    } else {
        log::warn!("no source file given and csv.auto_find_latest is disabled");
        Ok(None)
    }
}

fn source_resolver(config: &Config) -> SourceResolver {
    SourceResolver::new(&config.csv.scan_directory, &config.csv.file_pattern)
}

fn csv_source(config: &Config, path: &Path) -> Result<CsvSource> {
    CsvSource::new(path, config.separator_byte()?, &config.csv.encoding)
}

fn schema_builder(config: &Config) -> SchemaBuilder {
    SchemaBuilder::new(TypeInferencer::new(
        config.data_types.varchar_length,
        config.data_types.decimal_precision,
        config.data_types.decimal_scale,
    ))
}

fn sync_options(config: &Config, table: String, batch_size: usize) -> SyncOptions {
    SyncOptions {
        table,
        batch_size,
        auto_create_table: config.monitoring.auto_create_table,
        sample_rows: crate::DEFAULT_SAMPLE_ROWS,
    }
}
