pub mod connection;
pub mod import;
pub mod sales;

pub use import::import_file;
