use async_trait::async_trait;

use crate::error::ImportResult;
use crate::filter::{Filter, FilterResult};
use crate::types::{ImportRequest, RowCandidate};

/// Removes rows that lack a product name or a SKU.
pub struct IdentityFilter;

#[async_trait]
impl Filter<ImportRequest, RowCandidate> for IdentityFilter {
    async fn filter(
        &self,
        _query: &ImportRequest,
        candidates: Vec<RowCandidate>,
    ) -> ImportResult<FilterResult<RowCandidate>> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| c.raw.name().is_some() && c.raw.sku().is_some());

        Ok(FilterResult { kept, removed })
    }
}
