// errors.rs
use thiserror::Error;

/// Errors raised while loading, cleaning or exporting the sales table.
///
/// A SaleDate that cannot be parsed is not an error: the date stage turns it
/// into NULL. Donor ambiguity in the address fill is a config choice, not an
/// error either.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Workbook read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    /// DDL the engine refuses (SQLite cannot drop an indexed column, for one).
    #[error("Schema error: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, CleanError>;
