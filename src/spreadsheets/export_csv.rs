use std::io::Write;

use crate::domain::SaleRecord;
use crate::errors::Result;

/// Writes one CSV row per sale, with a header row taken from the record fields.
pub fn export_sales_csv<W: Write>(sales: &[SaleRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sale in sales {
        wtr.serialize(sale)?;
    }
    wtr.flush()?;
    Ok(())
}
