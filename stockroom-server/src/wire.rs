//! Request and response bodies. Keys are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockroom_core::{CategoryCount, DashboardOptions, DashboardView, StoredProduct};
use stockroom_pipeline::{ImportSummary, RejectedRow, ValidationReport};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductJson {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub stock_quantity: u32,
    pub profit: f64,
    pub upload_date: DateTime<Utc>,
}

impl From<&StoredProduct> for ProductJson {
    fn from(p: &StoredProduct) -> Self {
        Self {
            id: p.id,
            name: p.record.name.clone(),
            sku: p.record.sku.clone(),
            category: p.record.category.clone(),
            purchase_price: p.record.purchase_price,
            selling_price: p.record.selling_price,
            stock_quantity: p.record.stock_quantity,
            profit: p.record.profit(),
            upload_date: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadJson {
    pub message: &'static str,
    pub parsed_rows: usize,
    pub inserted: usize,
    pub blank_rows: usize,
    pub rejected: Vec<RejectedRow>,
}

impl From<ImportSummary> for UploadJson {
    fn from(summary: ImportSummary) -> Self {
        Self {
            message: "Upload successful",
            parsed_rows: summary.parsed_rows,
            inserted: summary.inserted,
            blank_rows: summary.blank_rows,
            rejected: summary.rejected,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateJson {
    pub valid: bool,
    pub row_count: usize,
    pub errors: Vec<String>,
}

impl From<ValidationReport> for ValidateJson {
    fn from(report: ValidationReport) -> Self {
        Self {
            valid: report.is_valid(),
            row_count: report.row_count,
            errors: report.issues.iter().map(|i| i.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryJson {
    pub total_profit: f64,
    pub total_products: usize,
    pub low_stock_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardJson {
    pub summary: SummaryJson,
    pub top_profit: Vec<ProductJson>,
    pub categories: Vec<CategoryCount>,
    pub low_stock: Vec<ProductJson>,
}

impl From<DashboardView<'_, StoredProduct>> for DashboardJson {
    fn from(view: DashboardView<'_, StoredProduct>) -> Self {
        Self {
            summary: SummaryJson {
                total_profit: view.summary.total_profit,
                total_products: view.summary.total_products,
                low_stock_count: view.summary.low_stock_count,
            },
            top_profit: view.top_profit.into_iter().map(ProductJson::from).collect(),
            categories: view.categories,
            low_stock: view.low_stock.into_iter().map(ProductJson::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// `GET /api/dashboard?top=N&threshold=T`; absent values use server defaults.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub top: Option<usize>,
    pub threshold: Option<u32>,
}

impl DashboardQuery {
    pub fn resolve(&self, defaults: DashboardOptions) -> DashboardOptions {
        DashboardOptions {
            top_n: self.top.unwrap_or(defaults.top_n),
            low_stock_threshold: self.threshold.unwrap_or(defaults.low_stock_threshold),
        }
    }
}
