//! The CSV header contract.
//!
//! Uploads are keyed by header name, never by position, so a file may list
//! these columns in any order and carry extra columns that are ignored.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ProductName,
    Sku,
    Category,
    PurchasePrice,
    SellingPrice,
    StockQuantity,
}

impl Column {
    /// Every column, in template order.
    pub const ALL: [Column; 6] = [
        Column::ProductName,
        Column::Sku,
        Column::Category,
        Column::PurchasePrice,
        Column::SellingPrice,
        Column::StockQuantity,
    ];

    /// Columns an upload must declare in its header row.
    pub const REQUIRED: [Column; 2] = [Column::ProductName, Column::Sku];

    pub fn header(self) -> &'static str {
        match self {
            Column::ProductName => "Product Name",
            Column::Sku => "SKU",
            Column::Category => "Category",
            Column::PurchasePrice => "Purchase Price",
            Column::SellingPrice => "Selling Price",
            Column::StockQuantity => "Stock Quantity",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header.trim())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}
