// src/cleaning/vacancy.rs

use rusqlite::{params, Connection};
use tracing::info;

use crate::db::sales::vacant_counts;
use crate::domain::logic::normalize_sold_as_vacant;
use crate::domain::record::TABLE;
use crate::errors::Result;

/// Rewrites every SoldAsVacant value the mapping changes ("Y", "N").
/// Values it leaves alone are not touched.
pub fn normalize_sold_as_vacant_column(conn: &Connection) -> Result<usize> {
    let mut stmt = conn.prepare(&format!(
        "UPDATE {TABLE} SET SoldAsVacant = ?1 WHERE SoldAsVacant = ?2"
    ))?;

    let mut changed = 0;
    for (value, count) in vacant_counts(conn)? {
        let Some(raw) = value else { continue };
        let Some(normalized) = normalize_sold_as_vacant(Some(raw.as_str())) else { continue };
        if normalized == raw {
            continue;
        }
        let n = stmt.execute(params![normalized, raw])?;
        info!(from = %raw, to = %normalized, rows = n, expected = count, "normalized SoldAsVacant");
        changed += n;
    }
    Ok(changed)
}
