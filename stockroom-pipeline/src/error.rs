//! Import and storage error types.
//!
//! Row-level failures never appear here as errors: they are recovered inside
//! the pipeline and reported in the `ImportSummary`. Everything below is a
//! failure of the whole upload.

use thiserror::Error;

use crate::validation::ValidationIssue;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A single row violated a table constraint (duplicate SKU, failed CHECK).
    /// The transaction stays usable.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the failure affects only the row being written.
    pub fn is_row_level(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            other => StoreError::Sqlite(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file type '{0}', please upload a CSV file")]
    UnsupportedFileType(String),

    #[error("CSV is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("{} validation issue(s) found", .0.len())]
    Validation(Vec<ValidationIssue>),

    #[error("upload I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("import worker failed: {0}")]
    Worker(String),
}

impl ImportError {
    /// Whether the upload itself is at fault (4xx) rather than the server (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedFileType(_)
                | ImportError::MissingColumns(_)
                | ImportError::Parse(_)
                | ImportError::Validation(_)
        )
    }
}

/// Result type alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
