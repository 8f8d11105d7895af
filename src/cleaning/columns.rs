// src/cleaning/columns.rs

use rusqlite::Connection;
use tracing::info;

use crate::db::connection::table_columns;
use crate::domain::record::{is_known_column, TABLE};
use crate::errors::{CleanError, Result};

/// Columns the cleaning stages read; dropping one would break a later run.
const PROTECTED: [&str; 8] = [
    "UniqueID",
    "ParcelID",
    "PropertyAddress",
    "SaleDate",
    "SalePrice",
    "LegalReference",
    "SoldAsVacant",
    "OwnerAddress",
];

/// Drops the listed columns. Names are checked before any DDL runs; a column
/// already gone is skipped. Returns the number dropped.
pub fn drop_columns(conn: &Connection, names: &[String]) -> Result<usize> {
    for name in names {
        if !is_known_column(name) {
            return Err(CleanError::Config(format!("cannot drop unknown column '{name}'")));
        }
        if PROTECTED.contains(&name.as_str()) {
            return Err(CleanError::Schema(format!("column '{name}' is required and cannot be dropped")));
        }
    }

    let present = table_columns(conn, TABLE)?;
    let mut dropped = 0;
    for name in names {
        if !present.contains(name) {
            info!(column = %name, "column already absent");
            continue;
        }
        conn.execute(&format!("ALTER TABLE {TABLE} DROP COLUMN {name}"), [])
            .map_err(|e| CleanError::Schema(format!("Failed to drop column {name}: {e}")))?;
        dropped += 1;
    }
    info!(dropped, "dropped unused columns");
    Ok(dropped)
}
