use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inventory item as it flows from an upload into the store.
///
/// Profit is not a field: it is derived from the two prices every time it is
/// read, so a stored record can never disagree with its own inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub stock_quantity: u32,
}

impl ProductRecord {
    /// `selling_price - purchase_price`.
    pub fn profit(&self) -> f64 {
        self.selling_price - self.purchase_price
    }
}

impl AsRef<ProductRecord> for ProductRecord {
    fn as_ref(&self) -> &ProductRecord {
        self
    }
}

/// A record read back from the store, with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    pub id: i64,
    #[serde(flatten)]
    pub record: ProductRecord,
    pub created_at: DateTime<Utc>,
}

impl AsRef<ProductRecord> for StoredProduct {
    fn as_ref(&self) -> &ProductRecord {
        &self.record
    }
}
