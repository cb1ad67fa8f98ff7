use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ImportResult;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{ImportRequest, ImportSummary};

/// Writes one audit line per committed import.
pub struct ImportLogSideEffect;

#[async_trait]
impl SideEffect<ImportRequest, ImportSummary> for ImportLogSideEffect {
    async fn run(
        &self,
        input: Arc<SideEffectInput<ImportRequest, ImportSummary>>,
    ) -> ImportResult<()> {
        let summary = &input.outcome;
        log::info!(
            "request_id={} file={} imported {} of {} rows ({} blank, {} rejected)",
            input.query.request_id,
            input.query.file_name.as_deref().unwrap_or("-"),
            summary.inserted,
            summary.parsed_rows,
            summary.blank_rows,
            summary.rejected.len()
        );
        Ok(())
    }
}
