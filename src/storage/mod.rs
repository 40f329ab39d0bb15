//! Storage layer.
//!
//! Two layers:
//! - **Record stores**: row-level access to a table of list rows
//!   ([`SqliteRecordStore`], [`InMemoryRecordStore`])
//! - **List tables**: mapping between list nodes and those rows
//!   ([`ListTable`])

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

pub mod list_table;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use list_table::{HEAD_POINTER_ID, HEAD_POINTER_LABEL, ListTable};
pub use memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;
pub use traits::{ListRow, RecordStore, RowFields};
