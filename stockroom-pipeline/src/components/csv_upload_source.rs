use async_trait::async_trait;

use crate::csv_loader::load_rows;
use crate::error::ImportResult;
use crate::source::Source;
use crate::types::{ImportRequest, RowCandidate};

/// Reads the spooled upload and numbers its data rows from 1.
pub struct CsvUploadSource;

#[async_trait]
impl Source<ImportRequest, RowCandidate> for CsvUploadSource {
    async fn get_candidates(&self, query: &ImportRequest) -> ImportResult<Vec<RowCandidate>> {
        let bytes = tokio::fs::read(&query.upload_path).await?;
        let rows = load_rows(bytes.as_slice())?;
        log::debug!(
            "request_id={} parsed {} rows from {}",
            query.request_id,
            rows.len(),
            query.upload_path.display()
        );
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| RowCandidate { row: idx + 1, raw })
            .collect())
    }
}
