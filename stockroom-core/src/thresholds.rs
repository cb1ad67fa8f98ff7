//! Centralized defaults for the dashboard views and row normalization.
//!
//! The import pipeline and the server both read these, so changing a value
//! here changes what the upload path persists and what the dashboard shows.

/// Number of products shown in the "top profitable products" view.
pub const DEFAULT_TOP_N: usize = 5;

/// Products with stock strictly below this quantity are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Category assigned to rows whose `Category` cell is absent or blank.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
