use std::path::PathBuf;

use serde::Serialize;

use crate::csv_loader::RawProductRow;
use crate::validation::ValidationIssue;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// One uploaded file to import or validate.
#[derive(Clone, Debug)]
pub struct ImportRequest {
    pub request_id: String,
    /// Where the upload was spooled. The caller owns the file.
    pub upload_path: PathBuf,
    pub file_name: Option<String>,
}

impl ImportRequest {
    pub fn new(request_id: impl Into<String>, upload_path: impl Into<PathBuf>) -> Self {
        Self {
            request_id: request_id.into(),
            upload_path: upload_path.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Candidate types
// ---------------------------------------------------------------------------

/// A parsed data row with its 1-based position in the upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowCandidate {
    pub row: usize,
    pub raw: RawProductRow,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A row that was parsed but not persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub sku: Option<String>,
    pub reason: String,
}

/// Outcome of a committed import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub parsed_rows: usize,
    /// Rows without name or SKU, skipped silently.
    pub blank_rows: usize,
    pub inserted: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Outcome of a dry-run validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub row_count: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}
