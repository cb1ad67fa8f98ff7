//! Lenient row normalization: raw CSV cells into a `ProductRecord`.

use stockroom_core::thresholds::DEFAULT_CATEGORY;
use stockroom_core::{Column, ProductRecord};
use thiserror::Error;

use crate::coerce::{parse_price, parse_quantity, CoerceError};
use crate::csv_loader::RawProductRow;
use crate::util::present;

/// Why a row could not become a product at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("row has neither Product Name nor SKU")]
    MissingIdentity,
    #[error("Product Name is required")]
    MissingName,
    #[error("SKU is required")]
    MissingSku,
}

fn or_zero<T: Default>(column: Column, sku: &str, parsed: Result<T, CoerceError>) -> T {
    parsed.unwrap_or_else(|err| {
        log::debug!("sku={} {} coerced to 0: {}", sku, column, err);
        T::default()
    })
}

/// Build a product from a raw row, coercing malformed numbers to zero.
pub fn to_product(raw: &RawProductRow) -> Result<ProductRecord, RowRejection> {
    let (name, sku) = match (raw.name(), raw.sku()) {
        (Some(name), Some(sku)) => (name, sku),
        (None, None) => return Err(RowRejection::MissingIdentity),
        (None, Some(_)) => return Err(RowRejection::MissingName),
        (Some(_), None) => return Err(RowRejection::MissingSku),
    };

    Ok(ProductRecord {
        name: name.to_string(),
        sku: sku.to_string(),
        category: present(&raw.category).unwrap_or(DEFAULT_CATEGORY).to_string(),
        purchase_price: or_zero(
            Column::PurchasePrice,
            sku,
            parse_price(raw.purchase_price.as_deref()),
        ),
        selling_price: or_zero(
            Column::SellingPrice,
            sku,
            parse_price(raw.selling_price.as_deref()),
        ),
        stock_quantity: or_zero(
            Column::StockQuantity,
            sku,
            parse_quantity(raw.stock_quantity.as_deref()),
        ),
    })
}
