use rusqlite::params;

use crate::config::{CleaningConfig, ImportConfig};
use crate::db::connection::{init_db, Database};
use crate::db::import::{import_csv_reader, ImportSummary};

pub const SAMPLE_CSV: &str = include_str!("fixtures/nashville_sample.csv");

/// Fresh in-memory database with the production schema and default cleaning config.
pub fn init_test_db() -> Database {
    init_test_db_with(&CleaningConfig::default())
}

pub fn init_test_db_with(cleaning: &CleaningConfig) -> Database {
    let mut db = Database::in_memory(cleaning)
        .unwrap_or_else(|e| panic!("Database open failed: {e}"));
    init_db(&mut db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

/// Loads the Nashville sample export.
pub fn load_sample(db: &mut Database) -> ImportSummary {
    import_csv_reader(db, SAMPLE_CSV.as_bytes(), &ImportConfig::default(), false)
        .expect("sample import failed")
}

/// Inserts one sale with just the columns the stages look at.
pub fn insert_sale(
    db: &Database,
    unique_id: i64,
    parcel_id: &str,
    property_address: Option<&str>,
    sale_date: Option<&str>,
    sale_price: i64,
    legal_reference: &str,
) {
    db.conn()
        .execute(
            r#"
            INSERT INTO housing_sales (UniqueID, ParcelID, PropertyAddress, SaleDate, SalePrice, LegalReference)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![unique_id, parcel_id, property_address, sale_date, sale_price, legal_reference],
        )
        .expect("insert failed");
}

pub fn address_of(db: &Database, unique_id: i64) -> Option<String> {
    db.conn()
        .query_row(
            "SELECT PropertyAddress FROM housing_sales WHERE UniqueID = ?1",
            params![unique_id],
            |r| r.get(0),
        )
        .expect("row not found")
}
