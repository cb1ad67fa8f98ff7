//! CSV product import for stockroom.
//!
//! Uploads flow through a staged pipeline (source, filter, persist, side
//! effects) into a transactional `ProductStore`.

pub mod coerce;
pub mod components;
pub mod csv_loader;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod pipelines;
pub mod side_effect;
pub mod source;
pub mod store;
pub mod template;
pub mod types;
pub mod util;
pub mod validation;

pub use csv_loader::{is_csv_upload, load_rows, RawProductRow};
pub use error::{ImportError, ImportResult, StoreError};
pub use pipelines::csv_import::CsvImportPipeline;
pub use store::{
    persist_batch, MemoryProductStore, PersistOutcome, ProductStore, SqliteProductStore,
    StoreTransaction,
};
pub use template::{csv_template, TEMPLATE_FILE_NAME};
pub use types::{ImportRequest, ImportSummary, RejectedRow, RowCandidate, ValidationReport};
pub use validation::{validate_rows, IssueKind, ValidationIssue};
