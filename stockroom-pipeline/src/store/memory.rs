use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use stockroom_core::{ProductRecord, StoredProduct};

use super::{ProductStore, StoreTransaction};
use crate::error::StoreError;

#[derive(Default)]
struct MemoryState {
    products: Vec<StoredProduct>,
    next_id: i64,
}

/// In-process store with the same uniqueness and all-or-nothing rules as
/// the SQLite store.
#[derive(Default)]
pub struct MemoryProductStore {
    state: Mutex<MemoryState>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl ProductStore for MemoryProductStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        let state = self.lock()?;
        let next_id = state.next_id;
        Ok(Box::new(MemoryTransaction {
            state,
            pending: Vec::new(),
            next_id,
        }))
    }

    fn list_products(&self) -> Result<Vec<StoredProduct>, StoreError> {
        Ok(self.lock()?.products.clone())
    }
}

struct MemoryTransaction<'a> {
    state: MutexGuard<'a, MemoryState>,
    pending: Vec<StoredProduct>,
    next_id: i64,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn insert(&mut self, record: &ProductRecord) -> Result<i64, StoreError> {
        let taken = self
            .state
            .products
            .iter()
            .chain(self.pending.iter())
            .any(|p| p.record.sku == record.sku);
        if taken {
            return Err(StoreError::Constraint(format!(
                "UNIQUE constraint failed: products.sku ({})",
                record.sku
            )));
        }
        if !(record.purchase_price >= 0.0 && record.selling_price >= 0.0) {
            return Err(StoreError::Constraint(format!(
                "CHECK constraint failed: prices of {} must be non-negative",
                record.sku
            )));
        }

        self.next_id += 1;
        self.pending.push(StoredProduct {
            id: self.next_id,
            record: record.clone(),
            created_at: Utc::now(),
        });
        Ok(self.next_id)
    }

    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        let pending = std::mem::take(&mut self.pending);
        self.state.products.extend(pending);
        self.state.next_id = self.next_id;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: &str) -> ProductRecord {
        ProductRecord {
            name: "Widget".into(),
            sku: sku.into(),
            category: "Tools".into(),
            purchase_price: 1.0,
            selling_price: 1.5,
            stock_quantity: 2,
        }
    }

    #[test]
    fn uncommitted_rows_are_invisible_and_discarded() {
        let store = MemoryProductStore::new();
        {
            let mut tx = store.begin().unwrap();
            tx.insert(&record("A")).unwrap();
        }
        assert!(store.list_products().unwrap().is_empty());

        let mut tx = store.begin().unwrap();
        let id = tx.insert(&record("A")).unwrap();
        tx.commit().unwrap();
        assert_eq!(store.list_products().unwrap()[0].id, id);
    }

    #[test]
    fn duplicate_against_committed_rows_is_a_constraint() {
        let store = MemoryProductStore::new();
        let mut tx = store.begin().unwrap();
        tx.insert(&record("A")).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        assert!(tx.insert(&record("A")).unwrap_err().is_row_level());
    }
}
