//! Dashboard aggregations.
//!
//! Every function here is pure: it borrows the input slice, never reorders
//! it, and returns views that point back into it. The same functions back
//! every presentation of the data, so the top-N, grouping, and low-stock
//! rules live in exactly one place.

use std::cmp::Ordering;

use serde::Serialize;

use crate::product::ProductRecord;
use crate::thresholds::{DEFAULT_TOP_N, LOW_STOCK_THRESHOLD};

/// Number of records sharing one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Headline figures shown above the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_profit: f64,
    pub total_products: usize,
    pub low_stock_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub top_n: usize,
    pub low_stock_threshold: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

/// All dashboard views computed over one snapshot of records.
#[derive(Debug, Clone)]
pub struct DashboardView<'a, T> {
    pub summary: InventorySummary,
    pub top_profit: Vec<&'a T>,
    pub categories: Vec<CategoryCount>,
    pub low_stock: Vec<&'a T>,
}

/// Descending by profit with NaN pushed to the end, so a corrupt price can
/// never surface as the top earner.
fn profit_descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// The `n` most profitable records, highest first.
///
/// The sort is stable: records with equal profit keep their input order.
pub fn top_by_profit<T: AsRef<ProductRecord>>(records: &[T], n: usize) -> Vec<&T> {
    let mut ranked: Vec<&T> = records.iter().collect();
    ranked.sort_by(|a, b| profit_descending(a.as_ref().profit(), b.as_ref().profit()));
    ranked.truncate(n);
    ranked
}

/// One entry per distinct category, in the order each category first appears.
pub fn group_by_category<T: AsRef<ProductRecord>>(records: &[T]) -> Vec<CategoryCount> {
    let mut groups: Vec<CategoryCount> = Vec::new();
    for record in records {
        let category = &record.as_ref().category;
        match groups.iter_mut().find(|g| &g.category == category) {
            Some(group) => group.count += 1,
            None => groups.push(CategoryCount {
                category: category.clone(),
                count: 1,
            }),
        }
    }
    groups
}

/// Records with `stock_quantity < threshold`, lowest stock first.
pub fn low_stock<T: AsRef<ProductRecord>>(records: &[T], threshold: u32) -> Vec<&T> {
    let mut low: Vec<&T> = records
        .iter()
        .filter(|r| r.as_ref().stock_quantity < threshold)
        .collect();
    low.sort_by_key(|r| r.as_ref().stock_quantity);
    low
}

pub fn summarize<T: AsRef<ProductRecord>>(records: &[T], threshold: u32) -> InventorySummary {
    InventorySummary {
        total_profit: records.iter().map(|r| r.as_ref().profit()).sum(),
        total_products: records.len(),
        low_stock_count: records
            .iter()
            .filter(|r| r.as_ref().stock_quantity < threshold)
            .count(),
    }
}

pub fn dashboard<'a, T: AsRef<ProductRecord>>(
    records: &'a [T],
    options: &DashboardOptions,
) -> DashboardView<'a, T> {
    DashboardView {
        summary: summarize(records, options.low_stock_threshold),
        top_profit: top_by_profit(records, options.top_n),
        categories: group_by_category(records),
        low_stock: low_stock(records, options.low_stock_threshold),
    }
}
