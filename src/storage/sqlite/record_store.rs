//! `SQLite` implementation of [`RecordStore`].

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rusqlite::backup::Backup;
use rusqlite::{Connection, OptionalExtension, params};

use super::connection::{lock_connection, configure_connection};
use super::metrics::record_operation_metrics;
use super::sql;
use crate::storage::traits::{ListRow, RecordStore, RowFields};
use crate::{Error, Result};

/// Pages copied per step of an online backup.
const BACKUP_PAGES_PER_STEP: i32 = 64;

/// SQLite-based record store.
///
/// Holds a single connection behind a mutex. Every call runs one statement
/// in autocommit mode, so a sequence of calls is never atomic.
pub struct SqliteRecordStore {
    /// Database connection (mutex for interior mutability).
    conn: Mutex<Connection>,
    /// Database file, `None` for an in-memory database.
    path: Option<PathBuf>,
}

impl SqliteRecordStore {
    /// Opens (or creates) the database file at `path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_database_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_database".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        configure_connection(&conn)?;
        tracing::debug!(path = %path.display(), "opened record store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_database_memory".to_string(),
            cause: e.to_string(),
        })?;
        configure_connection(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file path, `None` for an in-memory database.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copies the whole database to `to` using the online backup API.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be opened or the copy
    /// fails.
    pub fn backup(&self, to: impl AsRef<Path>) -> Result<()> {
        let to = to.as_ref();
        self.with_conn("backup", |conn| {
            let mut dest = Connection::open(to)?;
            let backup = Backup::new(conn, &mut dest)?;
            backup.run_to_completion(BACKUP_PAGES_PER_STEP, Duration::from_millis(10), None)?;
            Ok(())
        })?;
        tracing::info!(to = %to.display(), "database backed up");
        Ok(())
    }

    /// Runs `f` against the connection, recording metrics and mapping the
    /// `rusqlite` error into [`Error::OperationFailed`].
    fn with_conn<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        let conn = lock_connection(&self.conn);
        let result = f(&conn);
        drop(conn);

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("sqlite", operation, start, status);

        result.map_err(|e| Error::OperationFailed {
            operation: operation.to_string(),
            cause: e.to_string(),
        })
    }
}

impl RecordStore for SqliteRecordStore {
    fn create_table(&self, table: &str) -> Result<()> {
        let table = sql::validate_table_name(table)?;
        self.with_conn("create_table", |conn| {
            conn.execute_batch(&sql::create_table_sql(table))
        })
    }

    fn insert(&self, table: &str, id: Option<i64>, fields: &RowFields) -> Result<i64> {
        let table = sql::validate_table_name(table)?;
        self.with_conn("insert", |conn| {
            conn.execute(
                &sql::insert_sql(table),
                params![id, fields.next_id, fields.payload_id, fields.label],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn update(&self, table: &str, id: i64, fields: &RowFields) -> Result<bool> {
        let table = sql::validate_table_name(table)?;
        let rows = self.with_conn("update", |conn| {
            conn.execute(
                &sql::update_sql(table),
                params![fields.next_id, fields.payload_id, fields.label, id],
            )
        })?;
        Ok(rows > 0)
    }

    fn select_by_id(&self, table: &str, id: i64) -> Result<Option<ListRow>> {
        let table = sql::validate_table_name(table)?;
        self.with_conn("select_by_id", |conn| {
            conn.query_row(&sql::select_by_id_sql(table), params![id], |row| {
                Ok(ListRow {
                    id: row.get(0)?,
                    next_id: row.get(1)?,
                    payload_id: row.get(2)?,
                    label: row.get(3)?,
                })
            })
            .optional()
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        let table = sql::validate_table_name(table)?;
        let count: i64 = self.with_conn("count", |conn| {
            conn.query_row(&sql::count_sql(table), [], |row| row.get(0))
        })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn delete(&self, table: &str, id: i64) -> Result<bool> {
        let table = sql::validate_table_name(table)?;
        let rows = self.with_conn("delete", |conn| {
            conn.execute(&sql::delete_sql(table), params![id])
        })?;
        Ok(rows > 0)
    }

    fn ids(&self, table: &str) -> Result<Vec<i64>> {
        let table = sql::validate_table_name(table)?;
        self.with_conn("ids", |conn| {
            let mut stmt = conn.prepare(&sql::ids_sql(table))?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<i64>>>()?;
            Ok(ids)
        })
    }
}
