pub mod export_csv;
pub mod export_xlsx;

use rusqlite::Connection;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::cleaning::duplicates::find_duplicate_transactions;
use crate::db::sales::get_all_sales;
use crate::errors::{CleanError, Result};

pub use export_csv::export_sales_csv;
pub use export_xlsx::export_sales_xlsx;

/// Exports the table to `path`, choosing the format from its extension.
pub fn export(conn: &Connection, path: &Path) -> Result<usize> {
    let sales = get_all_sales(conn)?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("xlsx") => {
            let duplicates = find_duplicate_transactions(conn)?;
            export_sales_xlsx(&sales, &duplicates, path)?;
        }
        Some("csv") => {
            let file = File::create(path)?;
            export_sales_csv(&sales, BufWriter::new(file))?;
        }
        _ => {
            return Err(CleanError::Config(format!(
                "unsupported export format for '{}': use .xlsx or .csv",
                path.display()
            )))
        }
    }

    info!(rows = sales.len(), path = %path.display(), "exported sales");
    Ok(sales.len())
}
