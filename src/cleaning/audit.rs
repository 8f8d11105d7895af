// src/cleaning/audit.rs

use rusqlite::Connection;
use serde::Serialize;
use std::fmt;

use crate::cleaning::dedup::count_duplicate_ids;
use crate::cleaning::duplicates::find_duplicate_transactions;
use crate::db::sales;
use crate::errors::Result;

/// Snapshot of the properties a cleaned table should satisfy.
/// Safe to take at any point: before, between or after stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Audit {
    pub total_rows: i64,
    pub distinct_unique_ids: i64,
    pub repeated_unique_ids: i64,
    pub missing_property_addresses: i64,
    /// Missing addresses a same-parcel sibling could still supply.
    pub fillable_property_addresses: i64,
    pub unnormalized_sale_dates: i64,
    pub sold_as_vacant: Vec<VacantCount>,
    pub duplicate_transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacantCount {
    pub value: Option<String>,
    pub count: i64,
}

impl Audit {
    /// True when every invariant of a fully cleaned table holds.
    /// Business-key duplicates are only reported and do not count against a
    /// clean table.
    pub fn is_clean(&self) -> bool {
        self.repeated_unique_ids == 0
            && self.fillable_property_addresses == 0
            && self.unnormalized_sale_dates == 0
            && self
                .sold_as_vacant
                .iter()
                .all(|v| !matches!(v.value.as_deref(), Some("Y") | Some("N")))
    }
}

pub fn audit(conn: &Connection) -> Result<Audit> {
    let sold_as_vacant = sales::vacant_counts(conn)?
        .into_iter()
        .map(|(value, count)| VacantCount { value, count })
        .collect();

    Ok(Audit {
        total_rows: sales::count_rows(conn)?,
        distinct_unique_ids: sales::count_distinct_ids(conn)?,
        repeated_unique_ids: count_duplicate_ids(conn)?,
        missing_property_addresses: sales::count_missing_addresses(conn)?,
        fillable_property_addresses: sales::count_fillable_addresses(conn)?,
        unnormalized_sale_dates: sales::count_unnormalized_dates(conn)?,
        sold_as_vacant,
        duplicate_transactions: find_duplicate_transactions(conn)?.len(),
    })
}

impl fmt::Display for Audit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows:                     {}", self.total_rows)?;
        writeln!(f, "Distinct UniqueIDs:       {}", self.distinct_unique_ids)?;
        writeln!(f, "Repeated UniqueIDs:       {}", self.repeated_unique_ids)?;
        writeln!(f, "Missing PropertyAddress:  {}", self.missing_property_addresses)?;
        writeln!(f, "  fillable from siblings: {}", self.fillable_property_addresses)?;
        writeln!(f, "Unnormalized SaleDate:    {}", self.unnormalized_sale_dates)?;
        writeln!(f, "Duplicate transactions:   {}", self.duplicate_transactions)?;
        writeln!(f, "SoldAsVacant:")?;
        for v in &self.sold_as_vacant {
            writeln!(f, "  {:<8} {}", v.value.as_deref().unwrap_or("NULL"), v.count)?;
        }
        write!(f, "Clean:                    {}", if self.is_clean() { "yes" } else { "no" })
    }
}
