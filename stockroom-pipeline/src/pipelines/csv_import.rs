use std::sync::Arc;

use stockroom_core::{ProductRecord, ValidationPolicy};

use crate::components::csv_upload_source::CsvUploadSource;
use crate::components::identity_filter::IdentityFilter;
use crate::components::import_log_side_effect::ImportLogSideEffect;
use crate::error::{ImportError, ImportResult};
use crate::filter::Filter;
use crate::normalize::{to_product, RowRejection};
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::source::Source;
use crate::store::{persist_batch, ProductStore};
use crate::types::{ImportRequest, ImportSummary, RejectedRow, RowCandidate, ValidationReport};
use crate::validation::validate_rows;

/// The CSV import pipeline.
///
/// Pipeline flow:
/// 1. CsvUploadSource parses the spooled upload into numbered rows
/// 2. Strict policy only: every row is validated, any issue aborts
/// 3. IdentityFilter removes rows lacking a name or SKU
/// 4. Kept rows are normalized into products
/// 5. The batch is written in one store transaction on a blocking worker
/// 6. ImportLogSideEffect records the outcome
pub struct CsvImportPipeline {
    sources: Vec<Box<dyn Source<ImportRequest, RowCandidate>>>,
    filters: Vec<Box<dyn Filter<ImportRequest, RowCandidate>>>,
    side_effects: Arc<Vec<Box<dyn SideEffect<ImportRequest, ImportSummary>>>>,
    store: Arc<dyn ProductStore>,
    policy: ValidationPolicy,
}

impl CsvImportPipeline {
    pub fn new(store: Arc<dyn ProductStore>, policy: ValidationPolicy) -> Self {
        let sources: Vec<Box<dyn Source<ImportRequest, RowCandidate>>> =
            vec![Box::new(CsvUploadSource)];

        let filters: Vec<Box<dyn Filter<ImportRequest, RowCandidate>>> =
            vec![Box::new(IdentityFilter)];

        let side_effects: Arc<Vec<Box<dyn SideEffect<ImportRequest, ImportSummary>>>> =
            Arc::new(vec![Box::new(ImportLogSideEffect)]);

        Self {
            sources,
            filters,
            side_effects,
            store,
            policy,
        }
    }

    async fn fetch_candidates(&self, request: &ImportRequest) -> ImportResult<Vec<RowCandidate>> {
        let mut candidates = Vec::new();
        for source in self.sources.iter().filter(|s| s.enable(request)) {
            let mut fetched = source.get_candidates(request).await.map_err(|err| {
                log::warn!(
                    "request_id={} source {} failed: {}",
                    request.request_id,
                    source.name(),
                    err
                );
                err
            })?;
            candidates.append(&mut fetched);
        }
        Ok(candidates)
    }

    /// Parse and validate an upload without persisting anything.
    pub async fn prevalidate(&self, request: ImportRequest) -> ImportResult<ValidationReport> {
        let candidates = self.fetch_candidates(&request).await?;
        let issues = validate_rows(&candidates);
        log::info!(
            "request_id={} validated {} rows, {} issue(s)",
            request.request_id,
            candidates.len(),
            issues.len()
        );
        Ok(ValidationReport {
            row_count: candidates.len(),
            issues,
        })
    }

    /// Import an upload: parse, filter, normalize, then persist in one batch.
    pub async fn execute(&self, request: ImportRequest) -> ImportResult<ImportSummary> {
        let candidates = self.fetch_candidates(&request).await?;
        let parsed_rows = candidates.len();

        if self.policy == ValidationPolicy::Strict {
            let issues = validate_rows(&candidates);
            if !issues.is_empty() {
                log::warn!(
                    "request_id={} strict validation rejected upload: {} issue(s)",
                    request.request_id,
                    issues.len()
                );
                return Err(ImportError::Validation(issues));
            }
        }

        let mut kept = candidates;
        let mut removed: Vec<(RowCandidate, String)> = Vec::new();
        for filter in self.filters.iter().filter(|f| f.enable(&request)) {
            let result = filter.filter(&request, kept).await?;
            let name = filter.name().to_string();
            removed.extend(result.removed.into_iter().map(|c| (c, name.clone())));
            kept = result.kept;
        }

        let mut blank_rows = 0;
        let mut rejected = Vec::new();
        for (candidate, filter_name) in removed {
            if candidate.raw.lacks_identity() {
                blank_rows += 1;
                continue;
            }
            let reason = match to_product(&candidate.raw) {
                Err(rejection) => rejection.to_string(),
                Ok(_) => format!("removed by {}", filter_name),
            };
            log::warn!(
                "request_id={} skipped row {}: {}",
                request.request_id,
                candidate.row,
                reason
            );
            rejected.push(RejectedRow {
                row: candidate.row,
                sku: candidate.raw.sku().map(str::to_string),
                reason,
            });
        }

        let mut records: Vec<(usize, ProductRecord)> = Vec::with_capacity(kept.len());
        for candidate in kept {
            match to_product(&candidate.raw) {
                Ok(record) => records.push((candidate.row, record)),
                Err(RowRejection::MissingIdentity) => blank_rows += 1,
                Err(rejection) => rejected.push(RejectedRow {
                    row: candidate.row,
                    sku: candidate.raw.sku().map(str::to_string),
                    reason: rejection.to_string(),
                }),
            }
        }

        let store = Arc::clone(&self.store);
        let request_id = request.request_id.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            persist_batch(store.as_ref(), &request_id, &records)
        })
        .await
        .map_err(|e| ImportError::Worker(e.to_string()))??;

        rejected.extend(outcome.rejected);
        rejected.sort_by_key(|r| r.row);

        let summary = ImportSummary {
            parsed_rows,
            blank_rows,
            inserted: outcome.inserted,
            rejected,
        };

        self.run_side_effects(request, summary.clone()).await;
        Ok(summary)
    }

    async fn run_side_effects(&self, request: ImportRequest, summary: ImportSummary) {
        let query = Arc::new(request);
        let input = Arc::new(SideEffectInput {
            query: Arc::clone(&query),
            outcome: summary,
        });
        for side_effect in self.side_effects.iter() {
            if !side_effect.enable(Arc::clone(&query)) {
                continue;
            }
            if let Err(err) = side_effect.run(Arc::clone(&input)).await {
                log::warn!(
                    "request_id={} side effect {} failed: {}",
                    query.request_id,
                    side_effect.name(),
                    err
                );
            }
        }
    }
}
