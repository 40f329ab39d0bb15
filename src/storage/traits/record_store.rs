//! Record store trait.

use crate::Result;
use std::sync::Arc;

/// Writable columns of a list row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFields {
    /// Id of the row holding the next node, if any.
    pub next_id: Option<i64>,
    /// Opaque foreign key, or the head id on the head-pointer row.
    pub payload_id: Option<i64>,
    /// Free-form label.
    pub label: String,
}

/// A stored list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// Row identity.
    pub id: i64,
    /// Id of the row holding the next node, if any.
    pub next_id: Option<i64>,
    /// Opaque foreign key, or the head id on the head-pointer row.
    pub payload_id: Option<i64>,
    /// Free-form label.
    pub label: String,
}

impl ListRow {
    /// Builds a row from its id and fields.
    #[must_use]
    pub fn new(id: i64, fields: RowFields) -> Self {
        Self {
            id,
            next_id: fields.next_id,
            payload_id: fields.payload_id,
            label: fields.label,
        }
    }

    /// Writable columns of this row.
    #[must_use]
    pub fn fields(&self) -> RowFields {
        RowFields {
            next_id: self.next_id,
            payload_id: self.payload_id,
            label: self.label.clone(),
        }
    }
}

/// Minimal relational store for list tables.
///
/// Every table shares one fixed schema: `id` (primary key, store assigned),
/// `next_id`, `payload_id` (both nullable integers) and `label` (text).
/// Each call is independent; nothing spans two calls.
pub trait RecordStore: Send + Sync {
    /// Creates the table if it does not exist yet.
    fn create_table(&self, table: &str) -> Result<()>;

    /// Inserts a row and returns its id.
    ///
    /// With `id = None` the store assigns the next free id.
    fn insert(&self, table: &str, id: Option<i64>, fields: &RowFields) -> Result<i64>;

    /// Overwrites every field of row `id`. Returns `false` if no such row.
    fn update(&self, table: &str, id: i64, fields: &RowFields) -> Result<bool>;

    /// Fetches a row by id.
    fn select_by_id(&self, table: &str, id: i64) -> Result<Option<ListRow>>;

    /// Counts the rows of a table.
    fn count(&self, table: &str) -> Result<usize>;

    /// Removes row `id`. Returns `false` if no such row.
    fn delete(&self, table: &str, id: i64) -> Result<bool>;

    /// Lists every row id in ascending order.
    fn ids(&self, table: &str) -> Result<Vec<i64>>;

    /// Checks if a row exists.
    fn exists(&self, table: &str, id: i64) -> Result<bool> {
        Ok(self.select_by_id(table, id)?.is_some())
    }
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn create_table(&self, table: &str) -> Result<()> {
        (**self).create_table(table)
    }

    fn insert(&self, table: &str, id: Option<i64>, fields: &RowFields) -> Result<i64> {
        (**self).insert(table, id, fields)
    }

    fn update(&self, table: &str, id: i64, fields: &RowFields) -> Result<bool> {
        (**self).update(table, id, fields)
    }

    fn select_by_id(&self, table: &str, id: i64) -> Result<Option<ListRow>> {
        (**self).select_by_id(table, id)
    }

    fn count(&self, table: &str) -> Result<usize> {
        (**self).count(table)
    }

    fn delete(&self, table: &str, id: i64) -> Result<bool> {
        (**self).delete(table, id)
    }

    fn ids(&self, table: &str) -> Result<Vec<i64>> {
        (**self).ids(table)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn create_table(&self, table: &str) -> Result<()> {
        (**self).create_table(table)
    }

    fn insert(&self, table: &str, id: Option<i64>, fields: &RowFields) -> Result<i64> {
        (**self).insert(table, id, fields)
    }

    fn update(&self, table: &str, id: i64, fields: &RowFields) -> Result<bool> {
        (**self).update(table, id, fields)
    }

    fn select_by_id(&self, table: &str, id: i64) -> Result<Option<ListRow>> {
        (**self).select_by_id(table, id)
    }

    fn count(&self, table: &str) -> Result<usize> {
        (**self).count(table)
    }

    fn delete(&self, table: &str, id: i64) -> Result<bool> {
        (**self).delete(table, id)
    }

    fn ids(&self, table: &str) -> Result<Vec<i64>> {
        (**self).ids(table)
    }
}
