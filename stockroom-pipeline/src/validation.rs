//! Row validation for strict imports and pre-validation.

use std::fmt;

use serde::Serialize;

use crate::coerce::{parse_price, parse_quantity};
use crate::csv_loader::RawProductRow;
use crate::types::RowCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    MissingName,
    MissingSku,
    InvalidPurchasePrice,
    InvalidSellingPrice,
    InvalidStockQuantity,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MissingName => write!(f, "Product Name is required"),
            IssueKind::MissingSku => write!(f, "SKU is required"),
            IssueKind::InvalidPurchasePrice => write!(f, "Invalid Purchase Price"),
            IssueKind::InvalidSellingPrice => write!(f, "Invalid Selling Price"),
            IssueKind::InvalidStockQuantity => write!(f, "Invalid Stock Quantity"),
        }
    }
}

/// A problem found in one row. `row` is 1-based over the data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub row: usize,
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.kind)
    }
}

/// Issues for a single row, in column order.
pub fn validate_row(row: usize, raw: &RawProductRow) -> Vec<ValidationIssue> {
    if raw.is_blank() {
        return Vec::new();
    }

    let mut kinds = Vec::new();
    if raw.name().is_none() {
        kinds.push(IssueKind::MissingName);
    }
    if raw.sku().is_none() {
        kinds.push(IssueKind::MissingSku);
    }
    if parse_price(raw.purchase_price.as_deref()).is_err() {
        kinds.push(IssueKind::InvalidPurchasePrice);
    }
    if parse_price(raw.selling_price.as_deref()).is_err() {
        kinds.push(IssueKind::InvalidSellingPrice);
    }
    if parse_quantity(raw.stock_quantity.as_deref()).is_err() {
        kinds.push(IssueKind::InvalidStockQuantity);
    }

    kinds.into_iter().map(|kind| ValidationIssue { row, kind }).collect()
}

pub fn validate_rows(rows: &[RowCandidate]) -> Vec<ValidationIssue> {
    rows.iter()
        .flat_map(|c| validate_row(c.row, &c.raw))
        .collect()
}
