pub mod aggregate;
pub mod columns;
pub mod policy;
pub mod product;
pub mod thresholds;

pub use aggregate::{
    dashboard, group_by_category, low_stock, summarize, top_by_profit, CategoryCount,
    DashboardOptions, DashboardView, InventorySummary,
};
pub use columns::Column;
pub use policy::{ParsePolicyError, ValidationPolicy};
pub use product::{ProductRecord, StoredProduct};
