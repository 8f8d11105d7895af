use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::config::ImportConfig;
use crate::db::connection::Database;
use crate::domain::logic::{clean_sale_price, ISO_DATE};
use crate::domain::record::{BASE_COLUMNS, TABLE};
use crate::errors::{CleanError, Result};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
    /// Headers in the file that match no table column.
    pub ignored_headers: Vec<String>,
}

/// Reduces a header to the form used for matching: lowercase, no spaces, no underscores.
/// The raw export ships "UniqueID " with a trailing space, among others.
fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps each column position onto a table column, or None when unknown.
fn map_headers(headers: &[String]) -> (Vec<Option<&'static str>>, Vec<String>) {
    let mut ignored = Vec::new();
    let mut mapping: Vec<Option<&'static str>> = Vec::with_capacity(headers.len());
    for h in headers {
        let key = header_key(h);
        let found = BASE_COLUMNS
            .iter()
            .copied()
            .find(|col| header_key(col) == key)
            // A column repeated in the file is only loaded from its first occurrence.
            .filter(|col| !mapping.contains(&Some(*col)));
        if found.is_none() {
            ignored.push(h.to_string());
        }
        mapping.push(found);
    }
    (mapping, ignored)
}

/// Imports a raw export, choosing the reader from the file extension.
pub fn import_file(
    db: &mut Database,
    path: &Path,
    opts: &ImportConfig,
    replace: bool,
) -> Result<ImportSummary> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("xlsx") | Some("xlsm") => import_xlsx(db, path, replace),
        Some("csv") | Some("tsv") | Some("txt") => import_csv(db, path, opts, replace),
        _ => Err(CleanError::Config(format!(
            "unsupported import format for '{}': use .csv or .xlsx",
            path.display()
        ))),
    }
}

pub fn import_csv(
    db: &mut Database,
    path: &Path,
    opts: &ImportConfig,
    replace: bool,
) -> Result<ImportSummary> {
    let file = File::open(path)
        .map_err(|e| CleanError::Import(format!("Failed to open '{}': {e}", path.display())))?;
    info!(path = %path.display(), "importing sales");
    import_csv_reader(db, file, opts, replace)
}

/// Loads every row of the CSV into the sales table inside one transaction.
///
/// Empty cells become NULL. A row whose UniqueID is not an integer is skipped.
pub fn import_csv_reader<R: Read>(
    db: &mut Database,
    reader: R,
    opts: &ImportConfig,
    replace: bool,
) -> Result<ImportSummary> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(opts.delimiter as u8)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let rows = rdr.records().map(|record| {
        record
            .map(|r| r.iter().map(str::to_string).collect())
            .map_err(CleanError::from)
    });
    load_rows(db, &headers, rows, replace)
}

/// Loads the first worksheet of an .xlsx export. The first row holds the headers.
pub fn import_xlsx(db: &mut Database, path: &Path, replace: bool) -> Result<ImportSummary> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        CleanError::Import(format!("'{}' has no worksheets", path.display()))
    })??;
    info!(path = %path.display(), "importing sales from workbook");

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| CleanError::Import(format!("'{}' is empty", path.display())))?
        .iter()
        .map(cell_text)
        .collect();

    load_rows(
        db,
        &headers,
        rows.map(|row| Ok(row.iter().map(cell_text).collect())),
        replace,
    )
}

/// Renders a workbook cell the way the same value would appear in a CSV export.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format(ISO_DATE).to_string())
            .unwrap_or_default(),
    }
}

/// Validates the headers and inserts the rows in one transaction.
fn load_rows<I>(
    db: &mut Database,
    headers: &[String],
    rows: I,
    replace: bool,
) -> Result<ImportSummary>
where
    I: Iterator<Item = Result<Vec<String>>>,
{
    let (mapping, ignored_headers) = map_headers(headers);

    for required in ["UniqueID", "ParcelID"] {
        if !mapping.contains(&Some(required)) {
            return Err(CleanError::Import(format!("missing required column '{required}'")));
        }
    }
    for h in &ignored_headers {
        warn!(header = %h, "ignoring unknown column");
    }

    // Positions of the columns we keep, in file order.
    let kept: Vec<(usize, &'static str)> = mapping
        .iter()
        .enumerate()
        .filter_map(|(i, col)| col.map(|c| (i, c)))
        .collect();

    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        if replace {
            let removed = tx.execute(&format!("DELETE FROM {TABLE}"), [])?;
            info!(removed, "cleared existing rows");
        }

        let (inserted, skipped) = insert_records(&tx, rows, &kept)?;
        tx.commit()?;

        info!(inserted, skipped, "import finished");
        Ok(ImportSummary {
            inserted,
            skipped,
            ignored_headers,
        })
    })
}

/// Parses a raw SalePrice into a number SQLite stores as INTEGER or REAL.
/// NaN and infinities are rejected.
fn sale_price_value(raw: &str) -> Option<Value> {
    let price = clean_sale_price(raw)
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())?;
    if price.fract() == 0.0 && price.abs() <= MAX_EXACT_INTEGER {
        Some(Value::Integer(price as i64))
    } else {
        Some(Value::Real(price))
    }
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn insert_records<I>(
    conn: &Connection,
    rows: I,
    kept: &[(usize, &'static str)],
) -> Result<(usize, usize)>
where
    I: Iterator<Item = Result<Vec<String>>>,
{
    let columns: Vec<&str> = kept.iter().map(|(_, c)| *c).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {TABLE} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;

    let mut inserted = 0;
    let mut skipped = 0;

    for (line, record) in rows.enumerate() {
        let record = record?;
        let mut values = Vec::with_capacity(kept.len());
        let mut valid = true;

        for (pos, column) in kept {
            let raw = record.get(*pos).map(|s| s.trim()).unwrap_or("");
            let value = match (*column, raw) {
                ("UniqueID", id) => match id.parse::<i64>() {
                    Ok(n) => Value::Integer(n),
                    Err(_) => {
                        warn!(line = line + 2, unique_id = %id, "skipping row without an integer UniqueID");
                        valid = false;
                        break;
                    }
                },
                (_, "") => Value::Null,
                ("SalePrice", price) => sale_price_value(price).unwrap_or_else(|| {
                    warn!(line = line + 2, sale_price = %price, "unreadable SalePrice stored as NULL");
                    Value::Null
                }),
                (_, text) => Value::Text(text.to_string()),
            };
            values.push(value);
        }

        if !valid {
            skipped += 1;
            continue;
        }

        stmt.execute(params_from_iter(values.iter()))?;
        inserted += 1;
    }

    Ok((inserted, skipped))
}
