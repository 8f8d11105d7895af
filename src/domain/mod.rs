pub mod logic;
pub mod record;

pub use record::{RankedSale, SaleRecord};
