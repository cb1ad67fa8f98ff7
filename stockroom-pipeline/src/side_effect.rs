use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ImportResult;
use crate::util;

/// Input provided to side effects once an import has committed.
#[derive(Clone)]
pub struct SideEffectInput<Q, O> {
    pub query: Arc<Q>,
    pub outcome: O,
}

/// An action that runs after commit and does not affect the import result.
/// Failures are logged and swallowed.
#[async_trait]
pub trait SideEffect<Q, O>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Decide if this side effect should run.
    fn enable(&self, _query: Arc<Q>) -> bool {
        true
    }

    async fn run(&self, input: Arc<SideEffectInput<Q, O>>) -> ImportResult<()>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
