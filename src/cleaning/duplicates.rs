// src/cleaning/duplicates.rs

use rusqlite::Connection;
use tracing::warn;

use crate::domain::record::{RankedSale, TABLE};
use crate::errors::Result;

const SQL_RANK_TRANSACTIONS: &str = include_str!("../../sql/rank_transactions.sql");

/// Every sale with its ROW_NUMBER inside its business-key partition,
/// lowest UniqueID first.
pub fn rank_transactions(conn: &Connection) -> Result<Vec<RankedSale>> {
    let mut stmt = conn.prepare(SQL_RANK_TRANSACTIONS)?;
    let rows = stmt.query_map([], |row| {
        Ok(RankedSale {
            unique_id: row.get("UniqueID")?,
            parcel_id: row.get("ParcelID")?,
            property_address: row.get("PropertyAddress")?,
            sale_price: row.get("SalePrice")?,
            sale_date: row.get("SaleDate")?,
            legal_reference: row.get("LegalReference")?,
            rank: row.get("row_num")?,
        })
    })?;

    let mut ranked = Vec::new();
    for r in rows {
        ranked.push(r?);
    }
    Ok(ranked)
}

/// Rows ranked above 1, i.e. repeats of an earlier transaction.
pub fn find_duplicate_transactions(conn: &Connection) -> Result<Vec<RankedSale>> {
    Ok(rank_transactions(conn)?
        .into_iter()
        .filter(RankedSale::is_duplicate)
        .collect())
}

/// Deletes every rank > 1 row. Only reached when the config opts in.
pub fn delete_duplicate_transactions(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute(
        &format!(
            r#"
            DELETE FROM {TABLE}
            WHERE rowid IN (
                SELECT rowid FROM (
                    SELECT rowid,
                        ROW_NUMBER() OVER (
                            PARTITION BY ParcelID, PropertyAddress, SalePrice, SaleDate, LegalReference
                            ORDER BY UniqueID
                        ) AS row_num
                    FROM {TABLE}
                )
                WHERE row_num > 1
            )
            "#
        ),
        [],
    )?;
    warn!(deleted, "deleted duplicate transactions");
    Ok(deleted)
}
