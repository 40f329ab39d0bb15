//! `SQLite` record store.
//!
//! ## Module Structure
//!
//! - `connection`: locking the shared [`Connection`](rusqlite::Connection), pragmas
//! - `sql`: Table-name validation and statement text
//! - `metrics`: Operation metrics recording
//! - `record_store`: [`SqliteRecordStore`], the [`RecordStore`](crate::storage::RecordStore) implementation

mod connection;
mod metrics;
mod record_store;
mod sql;

pub use connection::{configure_connection, lock_connection};
pub use metrics::record_operation_metrics;
pub use record_store::SqliteRecordStore;
pub use sql::validate_table_name;
