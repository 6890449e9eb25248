//! Database layer for medstock.

mod medications;
mod schema;

#[allow(unused_imports)]
pub use medications::*;
pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::models::MedicationRecord;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Read access to the medication inventory used by the resolver.
///
/// Name comparisons are case-insensitive.
pub trait InventoryStore {
    /// Record named `name` with `quantity_in_stock > 0`.
    fn find_exact_in_stock(&self, name: &str) -> DbResult<Option<MedicationRecord>>;

    /// Record named `name`, whatever its stock.
    fn find_exact(&self, name: &str) -> DbResult<Option<MedicationRecord>>;

    /// Every record, in catalog (insertion) order.
    fn list_all(&self) -> DbResult<Vec<MedicationRecord>>;
}

/// Shared database: the lock is taken per lookup, never across a whole
/// resolution, so a slow suggester does not stall other callers.
impl InventoryStore for Mutex<Database> {
    fn find_exact_in_stock(&self, name: &str) -> DbResult<Option<MedicationRecord>> {
        lock(self)?.find_exact_in_stock(name)
    }

    fn find_exact(&self, name: &str) -> DbResult<Option<MedicationRecord>> {
        lock(self)?.find_exact(name)
    }

    fn list_all(&self) -> DbResult<Vec<MedicationRecord>> {
        lock(self)?.list_all()
    }
}

fn lock(db: &Mutex<Database>) -> DbResult<MutexGuard<'_, Database>> {
    db.lock().map_err(|_| DbError::LockPoisoned)
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
