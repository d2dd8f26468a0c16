//! Edge cases around unusual source files

use crate::common::TestFixture;
use tabsync::data::CsvSource;
use tabsync::infer::TypeInferencer;
use tabsync::progress::ProgressReporter;
use tabsync::schema::SchemaBuilder;
use tabsync::sync::SyncEngine;
use tabsync::TabsyncError;

#[test]
fn test_short_rows_are_padded_and_stored() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture
        .create_csv("ragged.csv", "id,name,amount\n1,Alice,10.50\n2\n3,Carol\n")
        .unwrap();

    let report = fixture.run_sync(&file, "imported_data").unwrap();

    assert_eq!(report.rows_read, 3);
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(report.rows_failed, 0);
}

#[test]
fn test_headers_only_file_creates_empty_table() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("empty.csv", "id,name,amount\n").unwrap();

    let report = fixture.run_sync(&file, "imported_data").unwrap();

    assert!(report.table_created);
    assert_eq!(report.rows_read, 0);
    assert_eq!(report.rows_inserted, 0);

    let store = fixture.open_store().unwrap();
    assert!(store.table_exists("imported_data").unwrap());
    assert_eq!(store.row_count("imported_data").unwrap(), 0);
}

#[test]
fn test_completely_empty_file_is_rejected() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture.create_csv("nothing.csv", "").unwrap();

    let err = fixture.run_sync(&file, "imported_data").unwrap_err();
    assert!(matches!(err, TabsyncError::InvalidInput { .. }));
}

#[test]
fn test_unicode_rows_round_trip() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture
        .create_csv("unicode.csv", "city,motto\nMünchen,Grüß Gott\n東京,こんにちは\n")
        .unwrap();

    let first = fixture.run_sync(&file, "cities").unwrap();
    assert_eq!(first.rows_inserted, 2);

    // Fingerprints of non-ASCII rows stay stable across runs
    let second = fixture.run_sync(&file, "cities").unwrap();
    assert_eq!(second.rows_inserted, 0);
    assert_eq!(second.rows_skipped, 2);
}

#[test]
fn test_messy_headers_still_sync() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture
        .create_csv(
            "messy.csv",
            "Order ID,unit-price,Total (€)\n1,2.50,5.00\n2,3.00,3.00\n",
        )
        .unwrap();

    let report = fixture.run_sync(&file, "orders").unwrap();
    assert_eq!(report.rows_inserted, 2);

    let store = fixture.open_store().unwrap();
    let columns = store.table_columns("orders").unwrap();
    assert_eq!(columns, vec!["Order_ID", "unit_price", "Total_"]);
}

#[test]
fn test_semicolon_separated_source() {
    let fixture = TestFixture::new().unwrap();
    let file = fixture
        .create_csv("semi.csv", "id;name\n1;Alice\n2;Bob\n")
        .unwrap();

    let mut store = fixture.open_store().unwrap();
    let source = CsvSource::new(&file, b';', "utf-8").unwrap();
    let mut engine = SyncEngine::new(
        &mut store,
        SchemaBuilder::new(TypeInferencer::default()),
        fixture.sync_options("semi_data"),
    );

    let report = engine
        .sync(&source, &mut ProgressReporter::new_minimal())
        .unwrap();
    assert_eq!(report.rows_inserted, 2);
}
