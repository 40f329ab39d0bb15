//! Table-backed persistence for linked lists.
//!
//! One row per node: `next_id` mirrors the node's `next` link, `payload_id`
//! and `label` mirror the node fields. The `prev` link is not stored; loading
//! rebuilds it by appending rows in chain order.
//!
//! # Head pointer
//!
//! Which node is the head changes as nodes are inserted before it or
//! deleted, so the table reserves row `id = 1` as a fixed starting point. Its
//! `payload_id` holds the current head's id, or NULL for an empty list.
//!
//! # Write protocol
//!
//! A node without an id is written in two steps:
//!
//! 1. insert its own row, and store the returned id in the node;
//! 2. rewrite the predecessor's row, whose `next_id` could not reference the
//!    new id before step 1.
//!
//! Step 2 can itself insert (an unsaved predecessor), in which case the walk
//! continues backwards. The two steps are separate store calls: if the
//! process dies in between, the new row exists but nothing links to it yet.

use tracing::{debug, error, info};

use super::traits::{ListRow, RecordStore, RowFields};
use crate::list::{LinkedList, NestedList, Node, NodeRef, NodeSpec, Placement};
use crate::{Error, Result};

/// Row id reserved for the head pointer.
pub const HEAD_POINTER_ID: i64 = 1;

/// Label stored on the head-pointer row.
pub const HEAD_POINTER_LABEL: &str = "head pointer";

/// Outcome of writing a single node row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowWrite {
    /// A new row was created; the predecessor must be rewritten.
    Inserted,
    /// An existing row was overwritten.
    Updated,
    /// The handle was stale; nothing was written.
    Skipped,
}

/// Persistence adapter mapping list nodes to rows of one table.
///
/// # Example
///
/// ```rust
/// use nestlist::list::{LinkedList, NodeSpec, Placement};
/// use nestlist::storage::{InMemoryRecordStore, ListTable};
///
/// let store = InMemoryRecordStore::new();
/// let mut table = ListTable::new(&store, "cards")?;
///
/// let mut list = LinkedList::new();
/// let node = list.add_node(Placement::Append, NodeSpec::labeled("node-1"));
/// table.save(&mut list, node)?;
/// table.save_head_id(list.node_id())?;
///
/// let mut copy = LinkedList::new();
/// table.load(&mut copy)?;
/// assert_eq!(copy.labels(), vec!["node-1"]);
/// # Ok::<(), nestlist::Error>(())
/// ```
#[derive(Debug)]
pub struct ListTable<S> {
    store: S,
    table: String,
    head_id: Option<i64>,
}

impl<S: RecordStore> ListTable<S> {
    /// Creates the table if needed and makes sure the head-pointer row
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is invalid or the store fails.
    pub fn new(store: S, table: impl Into<String>) -> Result<Self> {
        let adapter = Self {
            store,
            table: table.into(),
            head_id: None,
        };
        adapter.init_table()?;
        Ok(adapter)
    }

    fn init_table(&self) -> Result<()> {
        self.store.create_table(&self.table)?;
        if self.store.select_by_id(&self.table, HEAD_POINTER_ID)?.is_none() {
            self.store
                .insert(&self.table, Some(HEAD_POINTER_ID), &head_pointer_fields(None))?;
            debug!(table = %self.table, "reserved head pointer row");
        }
        Ok(())
    }

    /// Table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The underlying record store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Head id as of the last [`load_head_id`](Self::load_head_id) or
    /// [`save_head_id`](Self::save_head_id).
    #[must_use]
    pub const fn head_id(&self) -> Option<i64> {
        self.head_id
    }

    /// Reads the current head id from the head-pointer row.
    ///
    /// `Ok(None)` means the stored list is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSentinel`] if the head-pointer row is gone,
    /// or the store error.
    pub fn load_head_id(&mut self) -> Result<Option<i64>> {
        let Some(row) = self.store.select_by_id(&self.table, HEAD_POINTER_ID)? else {
            error!(table = %self.table, "head pointer row is missing");
            return Err(Error::MissingSentinel {
                table: self.table.clone(),
            });
        };
        self.head_id = row.payload_id;
        Ok(self.head_id)
    }

    /// Points the head-pointer row at `head_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSentinel`] if the head-pointer row is gone,
    /// or the store error.
    pub fn save_head_id(&mut self, head_id: Option<i64>) -> Result<()> {
        let updated = self
            .store
            .update(&self.table, HEAD_POINTER_ID, &head_pointer_fields(head_id))?;
        if !updated {
            error!(table = %self.table, "head pointer row is missing");
            return Err(Error::MissingSentinel {
                table: self.table.clone(),
            });
        }
        debug!(table = %self.table, ?head_id, "saved head id");
        self.head_id = head_id;
        Ok(())
    }

    /// Checks that a node about to be added may claim `id`.
    ///
    /// `None` always passes. A preset id passes only when no row holds it
    /// yet, so [`save`](Self::save) cannot mistake another node's row for
    /// the new node's own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for the head-pointer id or an id
    /// already in the table, or the store error.
    pub fn check_new_id(&self, id: Option<i64>) -> Result<()> {
        let Some(id) = id else {
            return Ok(());
        };
        if id == HEAD_POINTER_ID {
            return Err(reserved_id_error(&self.table));
        }
        if self.store.exists(&self.table, id)? {
            return Err(Error::InvalidInput(format!(
                "row {id} of '{}' already belongs to another node",
                self.table
            )));
        }
        Ok(())
    }

    /// Writes `node` to the table.
    ///
    /// A node with an id gets its row overwritten. A node without one gets a
    /// new row, and then its predecessor is rewritten so that its `next_id`
    /// points at the new id. A node that carries an id the table has never
    /// seen is inserted under that id and handled like a new row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a node claiming the head-pointer
    /// id, or the store error.
    pub fn save(&self, list: &mut LinkedList, node: NodeRef) -> Result<()> {
        let mut pending = Some(node);
        while let Some(current) = pending {
            pending = match self.write_row(list, current)? {
                RowWrite::Inserted => list.node(current).and_then(Node::prev),
                RowWrite::Updated | RowWrite::Skipped => None,
            };
        }
        Ok(())
    }

    /// Saves `node` and both of its neighbors.
    ///
    /// After a single insert or move only these three rows can hold a stale
    /// `next_id` or `payload_id`.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`save`](Self::save).
    pub fn save_node_and_siblings(&self, list: &mut LinkedList, node: NodeRef) -> Result<()> {
        self.save(list, node)?;
        let (prev, next) = list
            .node(node)
            .map_or((None, None), |n| (n.prev(), n.next()));
        if let Some(prev) = prev {
            self.save(list, prev)?;
        }
        if let Some(next) = next {
            self.save(list, next)?;
        }
        Ok(())
    }

    /// Writes one row and reports whether it was created.
    fn write_row(&self, list: &mut LinkedList, at: NodeRef) -> Result<RowWrite> {
        let Some(node) = list.node(at) else {
            return Ok(RowWrite::Skipped);
        };
        let fields = RowFields {
            next_id: node.next().and_then(|next| list.node(next)).and_then(Node::id),
            payload_id: node.payload_id(),
            label: node.label().to_string(),
        };

        match node.id() {
            Some(HEAD_POINTER_ID) => Err(reserved_id_error(&self.table)),
            Some(id) => {
                if self.store.update(&self.table, id, &fields)? {
                    debug!(table = %self.table, id, "updated row");
                    Ok(RowWrite::Updated)
                } else {
                    self.store.insert(&self.table, Some(id), &fields)?;
                    debug!(table = %self.table, id, "inserted row with preset id");
                    Ok(RowWrite::Inserted)
                }
            },
            None => {
                let id = self.store.insert(&self.table, None, &fields)?;
                if let Some(node) = list.node_mut(at) {
                    node.set_id(Some(id));
                }
                debug!(table = %self.table, id, "inserted row");
                Ok(RowWrite::Inserted)
            },
        }
    }

    /// Appends every stored node to `into`, in chain order from the head.
    ///
    /// Returns the number of nodes loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSentinel`], [`Error::DanglingReference`] for a
    /// broken chain, or the store error.
    pub fn load(&mut self, into: &mut LinkedList) -> Result<usize> {
        let head_id = self.load_head_id()?;
        let rows = self.chain(head_id)?;
        let loaded = rows.len();
        for row in rows {
            into.add_node(Placement::Append, spec_from_row(row));
        }
        info!(table = %self.table, loaded, "loaded list");
        Ok(loaded)
    }

    /// Rebuilds a [`NestedList`]: the chain from the head holds the outer
    /// nodes, and each outer row's `payload_id` starts the chain of its
    /// sublist.
    ///
    /// Returns the number of outer nodes loaded.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_nested(&mut self, into: &mut NestedList) -> Result<usize> {
        let head_id = self.load_head_id()?;
        let outer_rows = self.chain(head_id)?;
        let loaded = outer_rows.len();
        let mut nodes = 0;
        for row in outer_rows {
            let sublist_rows = self.chain(row.payload_id)?;
            into.add_list(Placement::Append, spec_from_row(row));
            nodes += sublist_rows.len();
            for sub_row in sublist_rows {
                into.add_node(Placement::Append, spec_from_row(sub_row));
            }
        }
        info!(table = %self.table, lists = loaded, nodes, "loaded nested list");
        Ok(loaded)
    }

    /// Follows `next_id` links from `start`.
    fn chain(&self, start: Option<i64>) -> Result<Vec<ListRow>> {
        let mut rows = Vec::new();
        let mut next_id = start;
        while let Some(id) = next_id {
            let row = self
                .store
                .select_by_id(&self.table, id)?
                .ok_or_else(|| {
                    error!(table = %self.table, id, "chain points at a missing row");
                    Error::DanglingReference {
                        table: self.table.clone(),
                        id,
                    }
                })?;
            next_id = row.next_id;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Removes a node row. The head-pointer row cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for the head-pointer id, or the store
    /// error.
    pub fn delete_row(&self, id: i64) -> Result<bool> {
        if id == HEAD_POINTER_ID {
            return Err(reserved_id_error(&self.table));
        }
        let deleted = self.store.delete(&self.table, id)?;
        debug!(table = %self.table, id, deleted, "deleted row");
        Ok(deleted)
    }

    /// Number of rows, head pointer included.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub fn row_count(&self) -> Result<usize> {
        self.store.count(&self.table)
    }
}

fn head_pointer_fields(head_id: Option<i64>) -> RowFields {
    RowFields {
        next_id: None,
        payload_id: head_id,
        label: HEAD_POINTER_LABEL.to_string(),
    }
}

fn reserved_id_error(table: &str) -> Error {
    Error::InvalidInput(format!(
        "row {HEAD_POINTER_ID} of '{table}' is reserved for the head pointer"
    ))
}

fn spec_from_row(row: ListRow) -> NodeSpec {
    NodeSpec {
        id: Some(row.id),
        payload_id: row.payload_id,
        sublist: None,
        label: row.label,
    }
}
