//! Product persistence.
//!
//! A store hands out one transaction per import batch. Rows inserted through
//! a transaction become visible to `list_products` only after `commit`;
//! dropping an uncommitted transaction discards them.

pub mod memory;
pub mod sqlite;

use stockroom_core::{ProductRecord, StoredProduct};

use crate::error::StoreError;
use crate::types::RejectedRow;

pub use memory::MemoryProductStore;
pub use sqlite::SqliteProductStore;

pub trait ProductStore: Send + Sync {
    /// Open a transaction spanning one batch.
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError>;

    /// Every persisted product, in insertion order.
    fn list_products(&self) -> Result<Vec<StoredProduct>, StoreError>;
}

pub trait StoreTransaction {
    /// Insert one record and return its assigned id.
    ///
    /// A `StoreError::Constraint` leaves the transaction usable; any other
    /// error means the batch must be abandoned.
    fn insert(&mut self, record: &ProductRecord) -> Result<i64, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Result of writing one batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    pub inserted: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Write `(row, record)` pairs in one transaction.
///
/// Constraint violations skip the offending row. Any other failure rolls the
/// whole batch back and is returned.
pub fn persist_batch(
    store: &dyn ProductStore,
    request_id: &str,
    records: &[(usize, ProductRecord)],
) -> Result<PersistOutcome, StoreError> {
    let mut tx = store.begin()?;
    let mut outcome = PersistOutcome::default();

    for (row, record) in records {
        match tx.insert(record) {
            Ok(_) => outcome.inserted += 1,
            Err(err) if err.is_row_level() => {
                log::warn!(
                    "request_id={} skipped row {} sku={}: {}",
                    request_id,
                    row,
                    record.sku,
                    err
                );
                outcome.rejected.push(RejectedRow {
                    row: *row,
                    sku: Some(record.sku.clone()),
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                log::error!(
                    "request_id={} batch aborted at row {}: {}",
                    request_id,
                    row,
                    err
                );
                if let Err(rollback_err) = tx.rollback() {
                    log::error!("request_id={} rollback failed: {}", request_id, rollback_err);
                }
                return Err(err);
            }
        }
    }

    tx.commit()?;
    Ok(outcome)
}
