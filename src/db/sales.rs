use rusqlite::{params, Connection};

use crate::db::connection::table_columns;
use crate::domain::record::{SaleRecord, TABLE};
use crate::errors::Result;

/// Record columns after UniqueID and ParcelID, in `SaleRecord` field order.
const RECORD_COLUMNS: [&str; 13] = [
    "LandUse",
    "PropertyAddress",
    "SaleDate",
    "SalePrice",
    "LegalReference",
    "SoldAsVacant",
    "OwnerName",
    "OwnerAddress",
    "PropertySplitAddress",
    "PropertySplitCity",
    "OwnerSplitAddress",
    "OwnerSplitCity",
    "OwnerSplitState",
];

/// Fetches every sale ordered by UniqueID.
///
/// Works before the split stage and after unused columns are dropped:
/// columns missing from the table are selected as NULL.
pub fn get_all_sales(conn: &Connection) -> Result<Vec<SaleRecord>> {
    let present = table_columns(conn, TABLE)?;
    let selected: Vec<String> = RECORD_COLUMNS
        .iter()
        .map(|col| {
            if present.iter().any(|p| p == col) {
                col.to_string()
            } else {
                format!("NULL AS {col}")
            }
        })
        .collect();

    let sql = format!(
        "SELECT UniqueID, ParcelID, {} FROM {TABLE} ORDER BY UniqueID, rowid",
        selected.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(SaleRecord {
            unique_id: row.get(0)?,
            parcel_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            land_use: row.get(2)?,
            property_address: row.get(3)?,
            sale_date: row.get(4)?,
            sale_price: row.get(5)?,
            legal_reference: row.get(6)?,
            sold_as_vacant: row.get(7)?,
            owner_name: row.get(8)?,
            owner_address: row.get(9)?,
            property_split_address: row.get(10)?,
            property_split_city: row.get(11)?,
            owner_split_address: row.get(12)?,
            owner_split_city: row.get(13)?,
            owner_split_state: row.get(14)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

pub fn count_rows(conn: &Connection) -> Result<i64> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |r| r.get(0))?;
    Ok(n)
}

pub fn count_distinct_ids(conn: &Connection) -> Result<i64> {
    let n = conn.query_row(
        &format!("SELECT COUNT(DISTINCT UniqueID) FROM {TABLE}"),
        [],
        |r| r.get(0),
    )?;
    Ok(n)
}

pub fn count_missing_addresses(conn: &Connection) -> Result<i64> {
    let n = conn.query_row(
        &format!("SELECT COUNT(*) FROM {TABLE} WHERE PropertyAddress IS NULL"),
        [],
        |r| r.get(0),
    )?;
    Ok(n)
}

/// Rows with a NULL address that still have a same-parcel donor.
/// Zero once the address fill has run.
pub fn count_fillable_addresses(conn: &Connection) -> Result<i64> {
    let n = conn.query_row(
        &format!(
            r#"
            SELECT COUNT(*) FROM {TABLE} a
            WHERE a.PropertyAddress IS NULL
              AND EXISTS (
                SELECT 1 FROM {TABLE} b
                WHERE b.ParcelID = a.ParcelID
                  AND b.UniqueID <> a.UniqueID
                  AND b.PropertyAddress IS NOT NULL
              )
            "#
        ),
        [],
        |r| r.get(0),
    )?;
    Ok(n)
}

/// Non-null SaleDates that are not yet ISO dates.
pub fn count_unnormalized_dates(conn: &Connection) -> Result<i64> {
    let n = conn.query_row(
        &format!(
            r#"
            SELECT COUNT(*) FROM {TABLE}
            WHERE SaleDate IS NOT NULL
              AND (date(SaleDate) IS NULL OR date(SaleDate) <> SaleDate)
            "#
        ),
        [],
        |r| r.get(0),
    )?;
    Ok(n)
}

/// Distinct SoldAsVacant values with how often each occurs, most frequent first.
pub fn vacant_counts(conn: &Connection) -> Result<Vec<(Option<String>, i64)>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT SoldAsVacant, COUNT(*) AS n
        FROM {TABLE}
        GROUP BY SoldAsVacant
        ORDER BY n DESC, SoldAsVacant
        "#
    ))?;

    let rows = stmt.query_map(params![], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
