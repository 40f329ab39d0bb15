//! Write-through linked list.

use tracing::instrument;

use crate::Result;
use crate::list::{LinkedList, Navigator, Node, NodeRef, NodeSpec, Placement};
use crate::storage::{ListTable, RecordStore};

/// [`LinkedList`] whose structure is mirrored in a table.
///
/// # Example
///
/// ```rust
/// use nestlist::storage::InMemoryRecordStore;
/// use nestlist::{NodeSpec, PersistentList, Placement};
///
/// let store = InMemoryRecordStore::new();
/// let mut cards = PersistentList::open(&store, "cards")?;
/// cards.add_node(Placement::Append, NodeSpec::labeled("b"))?;
/// cards.navigate().first();
/// cards.add_node(Placement::BeforeCursor, NodeSpec::labeled("a"))?;
///
/// let mut reopened = PersistentList::open(&store, "cards")?;
/// assert_eq!(reopened.list().labels(), vec!["a", "b"]);
/// assert_eq!(reopened.load_head_id()?, cards.list().iter().next().and_then(|(_, n)| n.id()));
/// # Ok::<(), nestlist::Error>(())
/// ```
#[derive(Debug)]
pub struct PersistentList<S> {
    list: LinkedList,
    table: ListTable<S>,
}

impl<S: RecordStore> PersistentList<S> {
    /// Opens `table` in `store`, creating it if needed, and loads every
    /// stored node.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created or its chain cannot
    /// be read back.
    #[instrument(skip(store))]
    pub fn open(store: S, table: &str) -> Result<Self> {
        let mut table = ListTable::new(store, table)?;
        let mut list = LinkedList::new();
        table.load(&mut list)?;
        Ok(Self { list, table })
    }

    /// Inserts a node and writes it.
    ///
    /// Placement follows [`LinkedList::add_node`]. A node that becomes the
    /// head is also recorded in the head pointer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) when
    /// `spec.id` is already taken in the table; nothing is linked then.
    /// Returns an error if a row write fails. The node stays in memory.
    #[instrument(skip(self, spec), fields(table = %self.table.table_name(), label = %spec.label))]
    pub fn add_node(&mut self, placement: Placement, spec: NodeSpec) -> Result<NodeRef> {
        self.table.check_new_id(spec.id)?;
        let node = self.list.add_node(placement, spec);
        self.table.save(&mut self.list, node)?;
        if self.list.at_head() {
            self.table.save_head_id(self.list.node_id())?;
        }
        Ok(node)
    }

    /// Deletes `at` (default: the cursor node) and its row.
    ///
    /// The predecessor row and, when the head changed, the head pointer are
    /// rewritten before the row itself is removed. Returns the detached node,
    /// or `None` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns an error if a row write fails. The node is already detached
    /// in memory at that point.
    #[instrument(skip(self), fields(table = %self.table.table_name()))]
    pub fn delete(&mut self, at: Option<NodeRef>) -> Result<Option<Node>> {
        let Some(target) = at.or_else(|| self.list.cursor()) else {
            return Ok(None);
        };
        let prev = self.list.node(target).and_then(Node::prev);
        let was_head = self.list.head() == Some(target);

        let Some(removed) = self.list.delete(Some(target)) else {
            return Ok(None);
        };
        if let Some(prev) = prev {
            self.table.save(&mut self.list, prev)?;
        }
        if was_head {
            self.table.save_head_id(head_id(&self.list))?;
        }
        if let Some(id) = removed.id() {
            self.table.delete_row(id)?;
        }
        tracing::info!(id = ?removed.id(), remaining = self.list.len(), "deleted node");
        Ok(Some(removed))
    }

    /// Sets the label at the cursor and writes the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row write fails.
    pub fn set_label(&mut self, label: impl Into<String>) -> Result<()> {
        self.list.set_label(label);
        self.save_cursor()
    }

    /// Sets the payload id at the cursor and writes the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row write fails.
    pub fn set_payload_id(&mut self, payload_id: Option<i64>) -> Result<()> {
        self.list.set_payload_id(payload_id);
        self.save_cursor()
    }

    fn save_cursor(&mut self) -> Result<()> {
        match self.list.cursor() {
            Some(cursor) => self.table.save(&mut self.list, cursor),
            None => Ok(()),
        }
    }

    /// Cursor movement over the list.
    pub fn navigate(&mut self) -> Navigator<'_> {
        Navigator::new(&mut self.list)
    }

    /// Read access to the in-memory list.
    #[must_use]
    pub const fn list(&self) -> &LinkedList {
        &self.list
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

    /// Head id as last read or written.
    #[must_use]
    pub const fn head_id(&self) -> Option<i64> {
        self.table.head_id()
    }
}

pub(super) fn head_id(list: &LinkedList) -> Option<i64> {
    list.head().and_then(|head| list.node(head)).and_then(Node::id)
}
