// src/cleaning/dedup.rs

use rusqlite::Connection;
use tracing::info;

use crate::domain::record::{DuplicateGroup, TABLE};
use crate::errors::Result;

const SQL_DUPLICATE_GROUPS: &str = include_str!("../../sql/duplicate_groups.sql");

/// Number of surplus rows whose UniqueID already appears on another row.
pub fn count_duplicate_ids(conn: &Connection) -> Result<i64> {
    let n = conn.query_row(
        &format!("SELECT COUNT(*) - COUNT(DISTINCT UniqueID) FROM {TABLE}"),
        [],
        |r| r.get(0),
    )?;
    Ok(n)
}

/// Keeps one row per UniqueID, the first one loaded, and deletes the rest.
pub fn remove_duplicate_ids(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute(
        &format!(
            r#"
            DELETE FROM {TABLE}
            WHERE rowid NOT IN (
                SELECT MIN(rowid) FROM {TABLE} GROUP BY UniqueID
            )
            "#
        ),
        [],
    )?;
    info!(deleted, "removed rows with a repeated UniqueID");
    Ok(deleted)
}

/// Groups of rows sharing the whole business key. Reported, never deleted here.
pub fn duplicate_groups(conn: &Connection) -> Result<Vec<DuplicateGroup>> {
    let mut stmt = conn.prepare(SQL_DUPLICATE_GROUPS)?;
    let rows = stmt.query_map([], |row| {
        Ok(DuplicateGroup {
            parcel_id: row.get(0)?,
            property_address: row.get(1)?,
            sale_price: row.get(2)?,
            sale_date: row.get(3)?,
            legal_reference: row.get(4)?,
            size: row.get(5)?,
            canonical_unique_id: row.get(6)?,
        })
    })?;

    let mut groups = Vec::new();
    for g in rows {
        groups.push(g?);
    }
    Ok(groups)
}
