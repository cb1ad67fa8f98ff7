//! SQLite-backed product store.
//!
//! A single connection sits behind a mutex. A transaction holds the lock
//! from `BEGIN` to `COMMIT`, so batches are serialized and readers never see
//! a half-written batch. Readers do not see the pre-batch state either: a
//! `list_products` issued mid-batch blocks on the lock until the batch
//! commits or rolls back, then reads whatever state that left.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use stockroom_core::{ProductRecord, StoredProduct};

use super::{ProductStore, StoreTransaction};
use crate::error::StoreError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT    NOT NULL,
    sku            TEXT    NOT NULL UNIQUE,
    category       TEXT    NOT NULL,
    purchase_price REAL    NOT NULL CHECK (purchase_price >= 0),
    selling_price  REAL    NOT NULL CHECK (selling_price >= 0),
    stock_quantity INTEGER NOT NULL CHECK (stock_quantity >= 0),
    created_at     TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteProductStore {
    conn: Mutex<Connection>,
}

impl SqliteProductStore {
    /// Open (or create) a database file. `":memory:"` opens a private
    /// in-memory database that lives as long as the store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl ProductStore for SqliteProductStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTransaction {
            conn,
            finished: false,
        }))
    }

    fn list_products(&self) -> Result<Vec<StoredProduct>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, sku, category, purchase_price, selling_price, stock_quantity, created_at
             FROM products ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let created_at: String = row.get(7)?;
            Ok(StoredProduct {
                id: row.get(0)?,
                record: ProductRecord {
                    name: row.get(1)?,
                    sku: row.get(2)?,
                    category: row.get(3)?,
                    purchase_price: row.get(4)?,
                    selling_price: row.get(5)?,
                    stock_quantity: row.get(6)?,
                },
                created_at: parse_timestamp(7, &created_at)?,
            })
        })?;
        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }
}

struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn insert(&mut self, record: &ProductRecord) -> Result<i64, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO products (name, sku, category, purchase_price, selling_price, stock_quantity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        stmt.execute(params![
            record.name,
            record.sku,
            record.category,
            record.purchase_price,
            record.selling_price,
            record.stock_quantity,
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<(), StoreError> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(err) = self.conn.execute_batch("ROLLBACK") {
                log::error!("rollback of abandoned transaction failed: {}", err);
            }
        }
    }
}
