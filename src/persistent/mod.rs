//! Lists that write through to a table.
//!
//! [`PersistentList`] and [`PersistentNestedList`] pair an in-memory list
//! with a [`ListTable`](crate::storage::ListTable) over one table. The whole
//! structure is loaded when opened, and every structural change is written
//! before the call returns, touching only the rows whose links changed.
//!
//! # Durability
//!
//! Each row write is its own store call. A new node takes two writes (its
//! own row, then its predecessor's `next_id`); a crash between them leaves
//! the new row in the table but unreachable from the head.
//!
//! Deletes cascade: the node's row is removed after the rows that pointed at
//! it have been rewritten, and removing an outer node of a nested list also
//! removes every row of its sublist.

mod list;
mod nested;

pub use list::PersistentList;
pub use nested::PersistentNestedList;
