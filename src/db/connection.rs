use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

use crate::config::CleaningConfig;
use crate::domain::logic::{parse_sale_date, split_address, ISO_DATE};
use crate::errors::{CleanError, Result};

/// Highest segment index `address_part` will look up.
const MAX_ADDRESS_PARTS: i64 = 16;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Owns the one connection every stage works through.
/// Each stage borrows it explicitly; nothing is kept in globals.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the SQLite file and registers the cleaning functions.
    pub fn open(path: impl AsRef<Path>, cleaning: &CleaningConfig) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened database");
        Self::from_connection(conn, cleaning)
    }

    #[cfg(test)]
    pub fn in_memory(cleaning: &CleaningConfig) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, cleaning)
    }

    fn from_connection(conn: Connection, cleaning: &CleaningConfig) -> Result<Self> {
        register_functions(&conn, &cleaning.date_formats)?;
        Ok(Self { conn })
    }

    /// Provides a mutable connection to the closure.
    pub fn with_conn<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        f(&mut self.conn)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Creates the sales table and its indexes if they do not exist yet.
pub fn init_db(db: &mut Database) -> Result<()> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| CleanError::Schema(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    info!("database schema ready");
    Ok(())
}

/// Registers the two scalar functions the stages call from SQL:
///
/// - `try_parse_date(text)`: ISO date string, or NULL when no format matches.
/// - `address_part(text, n)`: the n-th (1-based) comma segment, `''` when
///   missing, NULL for a NULL address.
fn register_functions(conn: &Connection, date_formats: &[String]) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    let formats = date_formats.to_vec();
    conn.create_scalar_function("try_parse_date", 1, flags, move |ctx| {
        let parsed = match ctx.get_raw(0) {
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| parse_sale_date(s, &formats))
                .map(|d| d.format(ISO_DATE).to_string()),
            _ => None,
        };
        Ok(parsed)
    })?;

    conn.create_scalar_function("address_part", 2, flags, |ctx| {
        let index: i64 = ctx.get(1)?;
        let part = match ctx.get_raw(0) {
            ValueRef::Text(bytes) => {
                let address = String::from_utf8_lossy(bytes);
                if !(1..=MAX_ADDRESS_PARTS).contains(&index) {
                    Some(String::new())
                } else {
                    split_address(&address, index as usize).pop()
                }
            }
            ValueRef::Null => None,
            // Numbers and blobs carry no commas; treat them as a single segment.
            other => {
                let whole = match other {
                    ValueRef::Integer(i) => i.to_string(),
                    ValueRef::Real(r) => r.to_string(),
                    _ => String::new(),
                };
                Some(if index == 1 { whole } else { String::new() })
            }
        };
        Ok(part)
    })?;

    Ok(())
}

/// Lists the column names currently on `table`.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut columns = Vec::new();
    for r in rows {
        columns.push(r?);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let mut db = Database::in_memory(&CleaningConfig::default()).unwrap();
        init_db(&mut db).unwrap();
        db
    }

    #[test]
    fn try_parse_date_is_non_throwing() {
        let db = db();
        let (good, bad, null): (Option<String>, Option<String>, Option<String>) = db
            .conn()
            .query_row(
                "SELECT try_parse_date('April 9, 2013'), try_parse_date('garbage'), try_parse_date(NULL)",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(good.as_deref(), Some("2013-04-09"));
        assert_eq!(bad, None);
        assert_eq!(null, None);
    }

    #[test]
    fn address_part_pads_missing_segments() {
        let db = db();
        let (street, city, none): (String, String, Option<String>) = db
            .conn()
            .query_row(
                "SELECT address_part('123 Main St', 1), address_part('123 Main St', 2), address_part(NULL, 1)",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(street, "123 Main St");
        assert_eq!(city, "");
        assert_eq!(none, None);
    }

    #[test]
    fn address_part_ignores_out_of_range_index() {
        let db = db();
        let (zero, huge): (String, String) = db
            .conn()
            .query_row(
                "SELECT address_part('1 A ST, NASHVILLE', 0), address_part('1 A ST, NASHVILLE', 1000000000000000)",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(zero, "");
        assert_eq!(huge, "");
    }

    #[test]
    fn schema_creates_base_columns() {
        let db = db();
        let columns = table_columns(db.conn(), "housing_sales").unwrap();
        assert_eq!(columns.len(), 19);
        assert_eq!(columns[0], "UniqueID");
    }
}
