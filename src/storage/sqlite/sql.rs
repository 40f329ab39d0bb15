//! SQL text for list tables.
//!
//! Table names cannot be bound as parameters, so they are spliced into the
//! statement text. [`validate_table_name`] is the only gate in front of that.

use crate::{Error, Result};

/// Checks that `name` is a plain SQL identifier: an ASCII letter or `_`
/// followed by ASCII letters, digits or `_`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for anything else.
///
/// # Examples
///
/// ```
/// use nestlist::storage::sqlite::validate_table_name;
///
/// assert!(validate_table_name("test_table").is_ok());
/// assert!(validate_table_name("cards; DROP TABLE cards").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(Error::InvalidInput(format!(
            "table name '{name}' is not a plain identifier"
        )))
    }
}

pub(super) fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY,
            next_id INTEGER,
            payload_id INTEGER,
            label TEXT NOT NULL DEFAULT ''
        )"
    )
}

pub(super) fn insert_sql(table: &str) -> String {
    format!("INSERT INTO {table} (id, next_id, payload_id, label) VALUES (?1, ?2, ?3, ?4)")
}

pub(super) fn update_sql(table: &str) -> String {
    format!("UPDATE {table} SET next_id = ?1, payload_id = ?2, label = ?3 WHERE id = ?4")
}

pub(super) fn select_by_id_sql(table: &str) -> String {
    format!("SELECT id, next_id, payload_id, label FROM {table} WHERE id = ?1")
}

pub(super) fn count_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

pub(super) fn delete_sql(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = ?1")
}

pub(super) fn ids_sql(table: &str) -> String {
    format!("SELECT id FROM {table} ORDER BY id")
}
