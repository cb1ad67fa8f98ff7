//! CSV product loader.
//!
//! Parses uploaded CSV documents into `RawProductRow`s keyed by header name.
//! Recognized columns:
//!   Product Name, SKU, Category, Purchase Price, Selling Price, Stock Quantity
//!
//! `Product Name` and `SKU` must be declared in the header row; the other
//! columns are optional. Column order is free and unknown columns are ignored.
//! A header declared twice is a parse error.

use std::io::Read;

use serde::Deserialize;
use stockroom_core::Column;

use crate::error::{ImportError, ImportResult};
use crate::util::present;

const BOM: char = '\u{feff}';

/// One data row with every cell kept as trimmed text.
///
/// Blank cells and cells missing from a short row are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawProductRow {
    #[serde(rename = "Product Name", default)]
    pub name: Option<String>,
    #[serde(rename = "SKU", default)]
    pub sku: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Purchase Price", default)]
    pub purchase_price: Option<String>,
    #[serde(rename = "Selling Price", default)]
    pub selling_price: Option<String>,
    #[serde(rename = "Stock Quantity", default)]
    pub stock_quantity: Option<String>,
}

impl RawProductRow {
    pub fn name(&self) -> Option<&str> {
        present(&self.name)
    }

    pub fn sku(&self) -> Option<&str> {
        present(&self.sku)
    }

    /// True when the row carries neither a name nor a SKU.
    pub fn lacks_identity(&self) -> bool {
        self.name().is_none() && self.sku().is_none()
    }

    /// True when every recognized cell is blank, e.g. a `,,,,,` line.
    pub fn is_blank(&self) -> bool {
        Column::ALL.iter().all(|c| present(self.cell(*c)).is_none())
    }

    pub fn cell(&self, column: Column) -> &Option<String> {
        match column {
            Column::ProductName => &self.name,
            Column::Sku => &self.sku,
            Column::Category => &self.category,
            Column::PurchasePrice => &self.purchase_price,
            Column::SellingPrice => &self.selling_price,
            Column::StockQuantity => &self.stock_quantity,
        }
    }
}

/// Reject header rows that are empty or lack a required column.
fn check_headers(headers: &csv::StringRecord) -> ImportResult<()> {
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::Parse("CSV document is empty".to_string()));
    }

    let missing: Vec<String> = Column::REQUIRED
        .iter()
        .filter(|c| !headers.iter().any(|h| Column::from_header(h) == Some(**c)))
        .map(|c| c.header().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }
    Ok(())
}

/// Load product rows from a CSV reader.
pub fn load_rows<R: Read>(reader: R) -> ImportResult<Vec<RawProductRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut headers = csv_reader
        .headers()
        .map_err(|e| ImportError::Parse(format!("unreadable header row: {}", e)))?
        .clone();
    if headers.get(0).is_some_and(|h| h.starts_with(BOM)) {
        headers = headers
            .iter()
            .map(|h| h.trim_start_matches(BOM).trim())
            .collect();
        csv_reader.set_headers(headers.clone());
    }
    check_headers(&headers)?;

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize::<RawProductRow>().enumerate() {
        let row = result
            .map_err(|e| ImportError::Parse(format!("line {}: {}", line_num + 2, e)))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Whether an upload looks like a CSV file, by name or declared media type.
pub fn is_csv_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_name = file_name
        .map(|n| n.trim().to_ascii_lowercase().ends_with(".csv"))
        .unwrap_or(false);
    let by_type = content_type
        .and_then(|t| t.split(';').next())
        .map(|t| {
            let t = t.trim();
            t.eq_ignore_ascii_case("text/csv") || t.eq_ignore_ascii_case("application/csv")
        })
        .unwrap_or(false);
    by_name || by_type
}
