//! End-to-end tests of the incremental sync flow

use crate::common::{numbered_csv, TestFixture};
use tabsync::hash::RowFingerprinter;
use tabsync::infer::TypeInferencer;
use tabsync::schema::SchemaBuilder;
use tabsync::sync::SyncEngine;

#[test]
fn test_first_sync_creates_table_and_imports_all_rows() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("data.csv", &numbered_csv(100)).unwrap();

    let report = fixture.run_sync(&file, "imported_data").unwrap();

    assert!(report.table_created);
    assert_eq!(report.rows_read, 100);
    assert_eq!(report.rows_inserted, 100);
    assert_eq!(report.rows_skipped, 0);
    assert_eq!(report.rows_failed, 0);

    let store = fixture.open_store().unwrap();
    assert_eq!(store.row_count("imported_data").unwrap(), 100);
}

#[test]
fn test_second_sync_of_unchanged_file_inserts_nothing() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("data.csv", &numbered_csv(100)).unwrap();

    let first = fixture.run_sync(&file, "imported_data").unwrap();
    assert_eq!(first.rows_inserted, 100);

    let second = fixture.run_sync(&file, "imported_data").unwrap();
    assert!(!second.table_created);
    assert_eq!(second.rows_inserted, 0);
    assert_eq!(second.rows_skipped, 100);

    let store = fixture.open_store().unwrap();
    assert_eq!(store.row_count("imported_data").unwrap(), 100);
}

#[test]
fn test_appended_rows_are_the_only_new_inserts() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("data.csv", &numbered_csv(100)).unwrap();
    fixture.run_sync(&file, "imported_data").unwrap();

    // The exporter rewrites the file with five extra rows at the end
    fixture.create_csv("data.csv", &numbered_csv(105)).unwrap();
    let report = fixture.run_sync(&file, "imported_data").unwrap();

    assert_eq!(report.rows_read, 105);
    assert_eq!(report.rows_inserted, 5);
    assert_eq!(report.rows_skipped, 100);

    let store = fixture.open_store().unwrap();
    assert_eq!(store.row_count("imported_data").unwrap(), 105);
}

#[test]
fn test_fingerprints_survive_separate_connections() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("data.csv", &numbered_csv(10)).unwrap();
    fixture.run_sync(&file, "imported_data").unwrap();

    let store = fixture.open_store().unwrap();
    let fingerprints = store.load_fingerprints("imported_data").unwrap();
    assert_eq!(fingerprints.len(), 10);

    let expected = RowFingerprinter::new().fingerprint(&[
        "1".to_string(),
        "person_1".to_string(),
        "1.50".to_string(),
    ]);
    assert!(fingerprints.contains(&expected));
}

#[test]
fn test_concurrent_insert_between_load_and_write_is_not_double_counted() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("data.csv", &numbered_csv(2)).unwrap();
    fixture.run_sync(&file, "imported_data").unwrap();

    let row = vec![
        "3".to_string(),
        "person_3".to_string(),
        "3.50".to_string(),
    ];
    let fingerprint = RowFingerprinter::new().fingerprint(&row);

    // Our instance loads its view of the stored fingerprints first
    let mut ours = fixture.open_store().unwrap();
    let stale_view = ours.load_fingerprints("imported_data").unwrap();
    assert!(!stale_view.contains(&fingerprint));

    // Another instance wins the race for row 3
    let mut other = fixture.open_store().unwrap();
    let columns = other.table_columns("imported_data").unwrap();
    let theirs = other
        .insert_ignoring_duplicates(
            "imported_data",
            &columns,
            &[(row.clone(), fingerprint.clone())],
        )
        .unwrap();
    assert_eq!(theirs.inserted, 1);
    drop(other);

    // Based on its stale view, our instance still writes the row; the
    // store's unique constraint turns it into an ignored duplicate
    let outcome = ours
        .insert_ignoring_duplicates("imported_data", &columns, &[(row, fingerprint)])
        .unwrap();
    assert_eq!(outcome.inserted, 0);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(ours.row_count("imported_data").unwrap(), 3);
}

#[test]
fn test_status_preview_counts_without_writing() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("data.csv", &numbered_csv(10)).unwrap();
    fixture.run_sync(&file, "imported_data").unwrap();

    // Two rows appended since the last sync
    fixture.create_csv("data.csv", &numbered_csv(12)).unwrap();

    let mut store = fixture.open_store().unwrap();
    let source = fixture.csv_source(&file).unwrap();
    let mut engine = SyncEngine::new(
        &mut store,
        SchemaBuilder::new(TypeInferencer::default()),
        fixture.sync_options("imported_data"),
    );
    let status = engine.preview(&source).unwrap();

    assert!(status.table_exists);
    assert_eq!(status.rows_total, 12);
    assert_eq!(status.rows_new, 2);
    assert_eq!(status.rows_existing, 10);

    // Nothing was written
    assert_eq!(store.row_count("imported_data").unwrap(), 10);
}

#[test]
fn test_sync_into_second_table_is_independent() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("data.csv", &numbered_csv(5)).unwrap();

    fixture.run_sync(&file, "first_copy").unwrap();
    let report = fixture.run_sync(&file, "second_copy").unwrap();

    assert!(report.table_created);
    assert_eq!(report.rows_inserted, 5);

    let store = fixture.open_store().unwrap();
    assert_eq!(store.row_count("first_copy").unwrap(), 5);
    assert_eq!(store.row_count("second_copy").unwrap(), 5);
}
