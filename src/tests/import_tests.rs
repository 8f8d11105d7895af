// src/tests/import_tests.rs

use crate::cleaning::audit::audit;
use crate::config::ImportConfig;
use crate::db::import::{import_csv, import_csv_reader, import_file};
use crate::db::sales::{count_rows, get_all_sales};
use crate::errors::CleanError;
use crate::tests::utils::{init_test_db, load_sample};
use rust_xlsxwriter::Workbook;
use std::io::Write;

#[test]
fn sample_import_skips_bad_ids_and_reports_unknown_columns() {
    let mut db = init_test_db();
    let summary = load_sample(&mut db);

    assert_eq!(summary.inserted, 9);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.ignored_headers, vec!["Notes".to_string()]);
    assert_eq!(count_rows(db.conn()).unwrap(), 9);
}

#[test]
fn empty_cells_are_null_and_prices_are_numeric() {
    let mut db = init_test_db();
    load_sample(&mut db);

    let sales = get_all_sales(db.conn()).unwrap();
    let fox_chase = sales.iter().find(|s| s.unique_id == 2045).unwrap();
    assert_eq!(fox_chase.sale_price, Some(240000.0));
    assert_eq!(fox_chase.owner_name.as_deref(), Some("FRAZIER, CYRENTHA LYNETTE"));

    let rosehill = sales.iter().find(|s| s.unique_id == 43076).unwrap();
    assert_eq!(rosehill.property_address, None);
    assert_eq!(rosehill.owner_address, None);
    assert_eq!(rosehill.property_split_city, None);
}

#[test]
fn missing_parcel_column_is_rejected() {
    let mut db = init_test_db();
    let csv = "UniqueID,PropertyAddress\n1,\"1 A ST, NASHVILLE\"\n";

    let err = import_csv_reader(&mut db, csv.as_bytes(), &ImportConfig::default(), false)
        .unwrap_err();

    assert!(matches!(err, CleanError::Import(msg) if msg.contains("ParcelID")));
    assert_eq!(count_rows(db.conn()).unwrap(), 0);
}

#[test]
fn replace_clears_previous_load() {
    let mut db = init_test_db();
    load_sample(&mut db);

    let csv = "UniqueID,ParcelID\n7,001 00 0 001.00\n";
    let summary =
        import_csv_reader(&mut db, csv.as_bytes(), &ImportConfig::default(), true).unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(count_rows(db.conn()).unwrap(), 1);
}

#[test]
fn semicolon_delimited_file_from_disk() {
    let mut db = init_test_db();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "unique_id;parcel_id;sale_price").unwrap();
    writeln!(file, "11;002 00 0 010.00;$95,500").unwrap();
    writeln!(file, "12;002 00 0 011.00;call agent").unwrap();

    let opts = ImportConfig { delimiter: ';' };
    let summary = import_csv(&mut db, file.path(), &opts, false).unwrap();
    assert_eq!(summary.inserted, 2);

    let sales = get_all_sales(db.conn()).unwrap();
    assert_eq!(sales[0].sale_price, Some(95500.0));
    assert_eq!(sales[1].sale_price, None);
}

#[test]
fn non_finite_prices_are_stored_as_null() {
    let mut db = init_test_db();
    let csv = "UniqueID,ParcelID,SalePrice\n1,P1,NaN\n2,P2,inf\n3,P3,100\n4,P4,1250.5\n";

    let summary =
        import_csv_reader(&mut db, csv.as_bytes(), &ImportConfig::default(), false).unwrap();
    assert_eq!(summary.inserted, 4);

    let sales = get_all_sales(db.conn()).unwrap();
    let prices: Vec<Option<f64>> = sales.iter().map(|s| s.sale_price).collect();
    assert_eq!(prices, vec![None, None, Some(100.0), Some(1250.5)]);

    let stored: String = db
        .conn()
        .query_row("SELECT typeof(SalePrice) FROM housing_sales WHERE UniqueID = 3", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(stored, "integer");
    assert_eq!(audit(db.conn()).unwrap().total_rows, 4);
}

#[test]
fn xlsx_workbook_is_imported_through_the_same_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nashville.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["UniqueID ", "ParcelID", "PropertyAddress", "SaleDate", "SalePrice", "Notes"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_number(1, 0, 2045).unwrap();
    sheet.write_string(1, 1, "007 00 0 125.00").unwrap();
    sheet.write_string(1, 2, "1808  FOX CHASE DR, GOODLETTSVILLE").unwrap();
    sheet.write_string(1, 3, "April 9, 2013").unwrap();
    sheet.write_number(1, 4, 240000).unwrap();
    sheet.write_number(2, 0, 16918).unwrap();
    sheet.write_string(2, 1, "007 14 0 002.00").unwrap();
    sheet.write_string(2, 3, "June 10, 2014").unwrap();
    sheet.write_string(2, 4, "$95,500").unwrap();
    sheet.write_string(3, 0, "abc").unwrap();
    sheet.write_string(3, 1, "007 14 0 003.00").unwrap();
    workbook.save(&path).unwrap();

    let mut db = init_test_db();
    let summary = import_file(&mut db, &path, &ImportConfig::default(), false).unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.ignored_headers, vec!["Notes".to_string()]);

    let sales = get_all_sales(db.conn()).unwrap();
    assert_eq!(sales[0].unique_id, 2045);
    assert_eq!(sales[0].sale_price, Some(240000.0));
    assert_eq!(
        sales[0].property_address.as_deref(),
        Some("1808  FOX CHASE DR, GOODLETTSVILLE")
    );
    assert_eq!(sales[1].unique_id, 16918);
    assert_eq!(sales[1].property_address, None);
    assert_eq!(sales[1].sale_price, Some(95500.0));
}

#[test]
fn import_rejects_unknown_extension() {
    let mut db = init_test_db();
    let dir = tempfile::tempdir().unwrap();

    let err = import_file(
        &mut db,
        &dir.path().join("sales.json"),
        &ImportConfig::default(),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, CleanError::Config(_)));
}
