use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

use crate::domain::{RankedSale, SaleRecord};
use crate::errors::Result;

const SALES_HEADERS: [&str; 15] = [
    "UniqueID",
    "ParcelID",
    "Land Use",
    "Property Address",
    "Sale Date",
    "Sale Price",
    "Legal Reference",
    "Sold As Vacant",
    "Owner Name",
    "Owner Address",
    "Property Street",
    "Property City",
    "Owner Street",
    "Owner City",
    "Owner State",
];

const DUPLICATE_HEADERS: [&str; 7] = [
    "UniqueID",
    "ParcelID",
    "Property Address",
    "Sale Price",
    "Sale Date",
    "Legal Reference",
    "Rank",
];

/// Writes the cleaned sales and the duplicate report as two sheets of one workbook.
pub fn export_sales_xlsx(sales: &[SaleRecord], duplicates: &[RankedSale], path: &Path) -> Result<()> {
    let mut workbook = build_workbook(sales, duplicates)?;
    workbook.save(path)?;
    Ok(())
}

pub fn build_workbook(sales: &[SaleRecord], duplicates: &[RankedSale]) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sales")?;
    write_sales_sheet(worksheet, sales)?;

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Duplicates")?;
    write_duplicates_sheet(worksheet, duplicates)?;

    Ok(workbook)
}

fn write_headers(worksheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    Ok(())
}

/// NULL cells are left empty rather than written as "NULL".
fn write_opt_string(worksheet: &mut Worksheet, row: u32, col: u16, value: &Option<String>) -> Result<()> {
    if let Some(v) = value {
        worksheet.write_string(row, col, v)?;
    }
    Ok(())
}

fn write_sales_sheet(worksheet: &mut Worksheet, sales: &[SaleRecord]) -> Result<()> {
    write_headers(worksheet, &SALES_HEADERS)?;

    for (i, sale) in sales.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet.write_number(r, 0, sale.unique_id as f64)?;
        worksheet.write_string(r, 1, &sale.parcel_id)?;
        write_opt_string(worksheet, r, 2, &sale.land_use)?;
        write_opt_string(worksheet, r, 3, &sale.property_address)?;
        write_opt_string(worksheet, r, 4, &sale.sale_date)?;
        if let Some(price) = sale.sale_price {
            worksheet.write_number(r, 5, price)?;
        }
        write_opt_string(worksheet, r, 6, &sale.legal_reference)?;
        write_opt_string(worksheet, r, 7, &sale.sold_as_vacant)?;
        write_opt_string(worksheet, r, 8, &sale.owner_name)?;
        write_opt_string(worksheet, r, 9, &sale.owner_address)?;
        write_opt_string(worksheet, r, 10, &sale.property_split_address)?;
        write_opt_string(worksheet, r, 11, &sale.property_split_city)?;
        write_opt_string(worksheet, r, 12, &sale.owner_split_address)?;
        write_opt_string(worksheet, r, 13, &sale.owner_split_city)?;
        write_opt_string(worksheet, r, 14, &sale.owner_split_state)?;
    }
    Ok(())
}

fn write_duplicates_sheet(worksheet: &mut Worksheet, duplicates: &[RankedSale]) -> Result<()> {
    write_headers(worksheet, &DUPLICATE_HEADERS)?;

    for (i, dup) in duplicates.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet.write_number(r, 0, dup.unique_id as f64)?;
        write_opt_string(worksheet, r, 1, &dup.parcel_id)?;
        write_opt_string(worksheet, r, 2, &dup.property_address)?;
        if let Some(price) = dup.sale_price {
            worksheet.write_number(r, 3, price)?;
        }
        write_opt_string(worksheet, r, 4, &dup.sale_date)?;
        write_opt_string(worksheet, r, 5, &dup.legal_reference)?;
        worksheet.write_number(r, 6, dup.rank as f64)?;
    }
    Ok(())
}
