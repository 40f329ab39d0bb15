//! Storage backend traits.

mod record_store;

pub use record_store::{ListRow, RecordStore, RowFields};
