// src/domain/record.rs

use serde::Serialize;

/// Name of the single table every stage reads and writes.
pub const TABLE: &str = "housing_sales";

/// Columns created by `sql/schema.sql`, in declaration order.
pub const BASE_COLUMNS: [&str; 19] = [
    "UniqueID",
    "ParcelID",
    "LandUse",
    "PropertyAddress",
    "SaleDate",
    "SalePrice",
    "LegalReference",
    "SoldAsVacant",
    "OwnerName",
    "OwnerAddress",
    "Acreage",
    "TaxDistrict",
    "LandValue",
    "BuildingValue",
    "TotalValue",
    "YearBuilt",
    "Bedrooms",
    "FullBath",
    "HalfBath",
];

/// Columns appended by the address split stage.
pub const DERIVED_COLUMNS: [&str; 5] = [
    "PropertySplitAddress",
    "PropertySplitCity",
    "OwnerSplitAddress",
    "OwnerSplitCity",
    "OwnerSplitState",
];

pub fn is_known_column(name: &str) -> bool {
    BASE_COLUMNS.contains(&name) || DERIVED_COLUMNS.contains(&name)
}

/// One housing sale as read back from the table, cleaned or not.
/// Derived fields stay None until the split stage has added them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub unique_id: i64,
    pub parcel_id: String,
    pub land_use: Option<String>,
    pub property_address: Option<String>,
    pub sale_date: Option<String>,
    pub sale_price: Option<f64>,
    pub legal_reference: Option<String>,
    pub sold_as_vacant: Option<String>,
    pub owner_name: Option<String>,
    pub owner_address: Option<String>,

    // Derived address parts
    pub property_split_address: Option<String>,
    pub property_split_city: Option<String>,
    pub owner_split_address: Option<String>,
    pub owner_split_city: Option<String>,
    pub owner_split_state: Option<String>,
}

/// A group of rows sharing the full business key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub parcel_id: Option<String>,
    pub property_address: Option<String>,
    pub sale_price: Option<f64>,
    pub sale_date: Option<String>,
    pub legal_reference: Option<String>,
    pub size: i64,
    /// Lowest UniqueID in the group, the row a rank would keep.
    pub canonical_unique_id: i64,
}

/// A row with its position inside its business-key partition.
/// Rank 1 is the canonical row; anything above is a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSale {
    pub unique_id: i64,
    pub parcel_id: Option<String>,
    pub property_address: Option<String>,
    pub sale_price: Option<f64>,
    pub sale_date: Option<String>,
    pub legal_reference: Option<String>,
    pub rank: i64,
}

impl RankedSale {
    pub fn is_duplicate(&self) -> bool {
        self.rank > 1
    }
}
