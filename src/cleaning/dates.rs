// src/cleaning/dates.rs

use rusqlite::Connection;
use tracing::{info, warn};

use crate::domain::record::TABLE;
use crate::errors::Result;

/// Rows still holding a raw SaleDate. ISO values are already clean and are left
/// alone, so running the stage twice changes nothing.
const PENDING: &str = "SaleDate IS NOT NULL AND (date(SaleDate) IS NULL OR date(SaleDate) <> SaleDate)";

/// Rewrites SaleDate as an ISO date, or NULL when no configured format matches.
///
/// The trial cast (`try_parse_date`) is probed first so the unparsable rows can
/// be reported; the conversion itself is one UPDATE that cannot fail on bad input.
pub fn normalize_sale_dates(conn: &Connection) -> Result<usize> {
    let unparsable: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {TABLE} WHERE {PENDING} AND try_parse_date(SaleDate) IS NULL"),
        [],
        |r| r.get(0),
    )?;
    if unparsable > 0 {
        warn!(unparsable, "SaleDate values match no known format and will be set to NULL");
    }

    let updated = conn.execute(
        &format!("UPDATE {TABLE} SET SaleDate = try_parse_date(SaleDate) WHERE {PENDING}"),
        [],
    )?;
    info!(updated, unparsable, "normalized SaleDate");
    Ok(updated)
}
