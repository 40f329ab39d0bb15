//! # Nestlist
//!
//! Cursor-navigated doubly linked lists that nest, persisted incrementally to
//! a relational table.
//!
//! A [`LinkedList`] is a plain in-memory structure. A [`NestedList`] is a
//! ragged grid of such lists. The persistent variants
//! ([`PersistentList`], [`PersistentNestedList`]) pair either structure with
//! a [`ListTable`], which keeps one table row per node and rewrites only the
//! rows whose links actually changed.
//!
//! ## Table layout
//!
//! Every table has the columns `id`, `next_id`, `payload_id` and `label`.
//! Row `id = 1` is reserved: it never stores a node, and its `payload_id`
//! points at whichever node is currently the head.
//!
//! ## Example
//!
//! ```rust
//! use nestlist::storage::InMemoryRecordStore;
//! use nestlist::{NodeSpec, PersistentList, Placement};
//!
//! let store = InMemoryRecordStore::new();
//! let mut list = PersistentList::open(&store, "cards")?;
//! list.add_node(Placement::Append, NodeSpec::labeled("node-1"))?;
//! list.add_node(Placement::Append, NodeSpec::labeled("node-2"))?;
//!
//! let reopened = PersistentList::open(&store, "cards")?;
//! assert_eq!(reopened.list().labels(), vec!["node-1", "node-2"]);
//! # Ok::<(), nestlist::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod list;
pub mod observability;
pub mod persistent;
pub mod storage;

pub use config::NestlistConfig;
pub use list::{LinkedList, Navigator, NestedList, Node, NodeRef, NodeSpec, Placement};
pub use persistent::{PersistentList, PersistentNestedList};
pub use storage::{InMemoryRecordStore, ListTable, RecordStore, SqliteRecordStore};

/// Error type for nestlist operations.
///
/// Navigation never produces an error: walking off either end of a list or
/// reading from an empty one yields `None`. Errors are reserved for the
/// record store and for table invariants.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Table name is not a plain identifier, a node claims the reserved row id |
/// | `OperationFailed` | `SQLite` or filesystem operations fail, config cannot be parsed |
/// | `MissingSentinel` | The head-pointer row (`id = 1`) is absent from a table |
/// | `DanglingReference` | A stored `next_id`/`payload_id` points at a row that does not exist |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The head-pointer row is missing.
    ///
    /// Distinct from an empty list, which has the row with a NULL head.
    #[error("table '{table}' has no head pointer row")]
    MissingSentinel {
        /// The table that was read.
        table: String,
    },

    /// A row references a row id that is not in the table.
    #[error("table '{table}' references missing row {id}")]
    DanglingReference {
        /// The table that was read.
        table: String,
        /// The referenced row id.
        id: i64,
    },
}

/// Result type alias for nestlist operations.
pub type Result<T> = std::result::Result<T, Error>;
