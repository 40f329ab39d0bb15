//! In-memory record store for testing.
//!
//! Provides a fast, non-persistent implementation of [`RecordStore`] that
//! follows `SQLite` rowid rules: a store-assigned id is one more than the
//! largest id currently in the table.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Instant;

use super::sqlite::{record_operation_metrics, validate_table_name};
use super::traits::{ListRow, RecordStore, RowFields};
use crate::{Error, Result};

type Tables = HashMap<String, BTreeMap<i64, RowFields>>;

/// In-memory record store.
///
/// Uses `RwLock` for thread-safe access with reader-writer semantics.
/// Data is not persisted between runs.
///
/// # Example
///
/// ```rust
/// use nestlist::storage::{InMemoryRecordStore, RecordStore, RowFields};
///
/// let store = InMemoryRecordStore::new();
/// store.create_table("cards")?;
/// let id = store.insert("cards", None, &RowFields::default())?;
/// assert_eq!(id, 1);
/// # Ok::<(), nestlist::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables created so far.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.read().map(|t| t.len()).unwrap_or(0)
    }

    fn read<T>(&self, operation: &'static str, f: impl FnOnce(&Tables) -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let result = self
            .tables
            .read()
            .map_err(|e| lock_error(operation, &e.to_string()))
            .and_then(|tables| f(&tables));
        record(operation, start, result.is_ok());
        result
    }

    fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Tables) -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = self
            .tables
            .write()
            .map_err(|e| lock_error(operation, &e.to_string()))
            .and_then(|mut tables| f(&mut tables));
        record(operation, start, result.is_ok());
        result
    }
}

fn record(operation: &'static str, start: Instant, ok: bool) {
    let status = if ok { "success" } else { "error" };
    record_operation_metrics("memory", operation, start, status);
}

fn lock_error(operation: &str, cause: &str) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("lock poisoned: {cause}"),
    }
}

/// One past the largest id in use, as `SQLite` assigns rowids.
fn next_row_id(rows: &BTreeMap<i64, RowFields>) -> Option<i64> {
    rows.keys().next_back().map_or(Some(1), |last| last.checked_add(1))
}

fn no_such_table(operation: &str, table: &str) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("no such table: {table}"),
    }
}

impl RecordStore for InMemoryRecordStore {
    fn create_table(&self, table: &str) -> Result<()> {
        let table = validate_table_name(table)?;
        self.write("create_table", |tables| {
            tables.entry(table.to_string()).or_default();
            Ok(())
        })
    }

    fn insert(&self, table: &str, id: Option<i64>, fields: &RowFields) -> Result<i64> {
        self.write("insert", |tables| {
            let rows = tables
                .get_mut(table)
                .ok_or_else(|| no_such_table("insert", table))?;
            let id = match id {
                Some(id) => id,
                None => next_row_id(rows).ok_or_else(|| Error::OperationFailed {
                    operation: "insert".to_string(),
                    cause: format!("no row id left after {} in {table}", i64::MAX),
                })?,
            };
            if rows.contains_key(&id) {
                return Err(Error::OperationFailed {
                    operation: "insert".to_string(),
                    cause: format!("UNIQUE constraint failed: {table}.id = {id}"),
                });
            }
            rows.insert(id, fields.clone());
            Ok(id)
        })
    }

    fn update(&self, table: &str, id: i64, fields: &RowFields) -> Result<bool> {
        self.write("update", |tables| {
            let rows = tables
                .get_mut(table)
                .ok_or_else(|| no_such_table("update", table))?;
            Ok(rows.get_mut(&id).map(|row| *row = fields.clone()).is_some())
        })
    }

    fn select_by_id(&self, table: &str, id: i64) -> Result<Option<ListRow>> {
        self.read("select_by_id", |tables| {
            let rows = tables
                .get(table)
                .ok_or_else(|| no_such_table("select_by_id", table))?;
            Ok(rows.get(&id).map(|fields| ListRow::new(id, fields.clone())))
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        self.read("count", |tables| {
            tables
                .get(table)
                .map(BTreeMap::len)
                .ok_or_else(|| no_such_table("count", table))
        })
    }

    fn delete(&self, table: &str, id: i64) -> Result<bool> {
        self.write("delete", |tables| {
            let rows = tables
                .get_mut(table)
                .ok_or_else(|| no_such_table("delete", table))?;
            Ok(rows.remove(&id).is_some())
        })
    }

    fn ids(&self, table: &str) -> Result<Vec<i64>> {
        self.read("ids", |tables| {
            tables
                .get(table)
                .map(|rows| rows.keys().copied().collect())
                .ok_or_else(|| no_such_table("ids", table))
        })
    }
}
