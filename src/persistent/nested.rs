//! Write-through list of lists.

use tracing::instrument;

use super::list::head_id;
use crate::Result;
use crate::list::{LinkedList, Navigator, NestedList, Node, NodeRef, NodeSpec, Placement};
use crate::storage::{ListTable, RecordStore};

/// [`NestedList`] whose outer nodes and sublist nodes share one table.
///
/// Outer rows form the chain that starts at the head pointer; each outer
/// row's `payload_id` starts the chain of its sublist.
#[derive(Debug)]
pub struct PersistentNestedList<S> {
    grid: NestedList,
    table: ListTable<S>,
}

impl<S: RecordStore> PersistentNestedList<S> {
    /// Opens `table` in `store`, creating it if needed, and loads every outer
    /// node with its sublist.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created or a chain cannot be
    /// read back.
    #[instrument(skip(store))]
    pub fn open(store: S, table: &str) -> Result<Self> {
        let mut table = ListTable::new(store, table)?;
        let mut grid = NestedList::new();
        table.load_nested(&mut grid)?;
        Ok(Self { grid, table })
    }

    /// Adds an outer node with an empty sublist and writes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) when
    /// `spec.id` is already taken in the table, or an error if a row write
    /// fails.
    #[instrument(skip(self, spec), fields(table = %self.table.table_name(), label = %spec.label))]
    pub fn add_list(&mut self, placement: Placement, spec: NodeSpec) -> Result<NodeRef> {
        self.table.check_new_id(spec.id)?;
        let node = self.grid.add_list(placement, spec);
        self.table.save(self.grid.outer_mut(), node)?;
        if self.grid.at_head() {
            self.table.save_head_id(self.grid.outer().node_id())?;
        }
        Ok(node)
    }

    /// Adds a node to the selected sublist and writes it.
    ///
    /// When the node becomes the sublist head, the outer row is rewritten
    /// with the new head id. Returns `None` when no outer node is selected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) when
    /// `spec.id` is already taken in the table, or an error if a row write
    /// fails.
    #[instrument(skip(self, spec), fields(table = %self.table.table_name(), label = %spec.label))]
    pub fn add_node(&mut self, placement: Placement, spec: NodeSpec) -> Result<Option<NodeRef>> {
        let Some(outer) = self.grid.cursor() else {
            return Ok(None);
        };
        self.table.check_new_id(spec.id)?;
        let Some(node) = self.grid.add_node(placement, spec) else {
            return Ok(None);
        };

        let mut became_head = false;
        if let Some(sublist) = self.grid.sublist_mut() {
            self.table.save(sublist, node)?;
            became_head = sublist.head() == Some(node);
        }
        if became_head {
            // the id may only have been assigned by the save above
            self.grid.sync_head_id();
            self.table.save(self.grid.outer_mut(), outer)?;
        }
        Ok(Some(node))
    }

    /// Deletes `at` (default: the sublist cursor) from the selected sublist,
    /// along with its row.
    ///
    /// # Errors
    ///
    /// Returns an error if a row write fails.
    #[instrument(skip(self), fields(table = %self.table.table_name()))]
    pub fn delete_node(&mut self, at: Option<NodeRef>) -> Result<Option<Node>> {
        let Some(outer) = self.grid.cursor() else {
            return Ok(None);
        };
        let Some((target, prev)) = self.grid.sublist().and_then(|sublist| {
            let target = at.or_else(|| sublist.cursor())?;
            Some((target, sublist.node(target).and_then(Node::prev)))
        }) else {
            return Ok(None);
        };

        let head_before = self.grid.head_id();
        let Some(removed) = self.grid.delete_node(Some(target)) else {
            return Ok(None);
        };
        if let (Some(prev), Some(sublist)) = (prev, self.grid.sublist_mut()) {
            self.table.save(sublist, prev)?;
        }
        if self.grid.head_id() != head_before {
            self.table.save(self.grid.outer_mut(), outer)?;
        }
        if let Some(id) = removed.id() {
            self.table.delete_row(id)?;
        }
        tracing::info!(id = ?removed.id(), "deleted sublist node");
        Ok(Some(removed))
    }

    /// Deletes an outer node (default: the outer cursor), its row and the
    /// rows of every node in its sublist.
    ///
    /// # Errors
    ///
    /// Returns an error if a row write fails.
    #[instrument(skip(self), fields(table = %self.table.table_name()))]
    pub fn delete_list(&mut self, at: Option<NodeRef>) -> Result<Option<Node>> {
        let Some(target) = at.or_else(|| self.grid.cursor()) else {
            return Ok(None);
        };
        let prev = self.grid.outer().node(target).and_then(Node::prev);
        let was_head = self.grid.outer().head() == Some(target);

        let Some(removed) = self.grid.delete_list(Some(target)) else {
            return Ok(None);
        };
        if let Some(prev) = prev {
            self.table.save(self.grid.outer_mut(), prev)?;
        }
        if was_head {
            self.table.save_head_id(head_id(self.grid.outer()))?;
        }

        let mut rows = 0;
        let sublist_ids = removed.sublist().into_iter().flat_map(LinkedList::ids).flatten();
        for id in sublist_ids.chain(removed.id()) {
            if self.table.delete_row(id)? {
                rows += 1;
            }
        }
        tracing::info!(id = ?removed.id(), rows, "deleted list");
        Ok(Some(removed))
    }

    /// Sets the label of the selected outer node and writes the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row write fails.
    pub fn set_label(&mut self, label: impl Into<String>) -> Result<()> {
        let Some(outer) = self.grid.cursor() else {
            return Ok(());
        };
        self.grid.outer_mut().set_label(label);
        self.table.save(self.grid.outer_mut(), outer)
    }

    /// Sets the label at the sublist cursor and writes the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row write fails.
    pub fn set_node_label(&mut self, label: impl Into<String>) -> Result<()> {
        let Some(sublist) = self.grid.sublist_mut() else {
            return Ok(());
        };
        let Some(cursor) = sublist.cursor() else {
            return Ok(());
        };
        sublist.set_label(label);
        self.table.save(sublist, cursor)
    }

    /// Cursor movement over the outer list.
    pub fn navigate(&mut self) -> Navigator<'_> {
        Navigator::new(self.grid.outer_mut())
    }

    /// Cursor movement inside the selected sublist.
    pub fn navigate_sublist(&mut self) -> Option<Navigator<'_>> {
        self.grid.sublist_mut().map(Navigator::new)
    }

    /// Read access to the in-memory grid.
    #[must_use]
    pub const fn grid(&self) -> &NestedList {
        &self.grid
    }

    /// The table adapter.
    #[must_use]
    pub const fn table(&self) -> &ListTable<S> {
        &self.table
    }

    /// Re-reads the head id from the head-pointer row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSentinel`](crate::Error::MissingSentinel) if
    /// the row is gone, or the store error.
    pub fn load_head_id(&mut self) -> Result<Option<i64>> {
        self.table.load_head_id()
    }
}
