// src/cleaning/addresses.rs

use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::DonorPick;
use crate::db::connection::table_columns;
use crate::domain::record::{DERIVED_COLUMNS, TABLE};
use crate::errors::{CleanError, Result};

/// Self join on ParcelID. When a parcel has several donors SQLite uses
/// whichever joined row it meets first.
const FILL_ANY: &str = r#"
    UPDATE housing_sales AS a
    SET PropertyAddress = b.PropertyAddress
    FROM housing_sales AS b
    WHERE a.ParcelID = b.ParcelID
      AND a.UniqueID <> b.UniqueID
      AND a.PropertyAddress IS NULL
      AND b.PropertyAddress IS NOT NULL
"#;

const FILL_LOWEST_ID: &str = r#"
    UPDATE housing_sales
    SET PropertyAddress = (
        SELECT b.PropertyAddress
        FROM housing_sales AS b
        WHERE b.ParcelID = housing_sales.ParcelID
          AND b.UniqueID <> housing_sales.UniqueID
          AND b.PropertyAddress IS NOT NULL
        ORDER BY b.UniqueID
        LIMIT 1
    )
    WHERE PropertyAddress IS NULL
      AND EXISTS (
        SELECT 1
        FROM housing_sales AS b
        WHERE b.ParcelID = housing_sales.ParcelID
          AND b.UniqueID <> housing_sales.UniqueID
          AND b.PropertyAddress IS NOT NULL
      )
"#;

/// Copies a PropertyAddress from a same-parcel sibling into rows missing one.
/// Rows whose parcel has no addressed sibling stay NULL.
pub fn fill_missing_addresses(conn: &Connection, pick: DonorPick) -> Result<usize> {
    let sql = match pick {
        DonorPick::Any => FILL_ANY,
        DonorPick::LowestUniqueId => FILL_LOWEST_ID,
    };
    let filled = conn.execute(sql, [])?;
    info!(filled, donor_pick = ?pick, "filled missing PropertyAddress");
    Ok(filled)
}

/// Appends the derived address columns that are not on the table yet.
/// Returns how many were added.
pub fn ensure_derived_columns(conn: &Connection) -> Result<usize> {
    let present = table_columns(conn, TABLE)?;
    let mut added = 0;

    for col in DERIVED_COLUMNS {
        if present.iter().any(|p| p == col) {
            continue;
        }
        conn.execute(&format!("ALTER TABLE {TABLE} ADD COLUMN {col} TEXT"), [])
            .map_err(|e| CleanError::Schema(format!("Failed to add column {col}: {e}")))?;
        debug!(column = col, "added derived column");
        added += 1;
    }
    Ok(added)
}

/// Splits PropertyAddress into street and city, and OwnerAddress into
/// street, city and state. Missing segments become empty strings.
pub fn split_addresses(conn: &Connection) -> Result<usize> {
    ensure_derived_columns(conn)?;

    let updated = conn.execute(
        &format!(
            r#"
            UPDATE {TABLE} SET
                PropertySplitAddress = address_part(PropertyAddress, 1),
                PropertySplitCity    = address_part(PropertyAddress, 2),
                OwnerSplitAddress    = address_part(OwnerAddress, 1),
                OwnerSplitCity       = address_part(OwnerAddress, 2),
                OwnerSplitState      = address_part(OwnerAddress, 3)
            "#
        ),
        [],
    )?;
    info!(updated, "split property and owner addresses");
    Ok(updated)
}
