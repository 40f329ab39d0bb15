//! List of lists.
//!
//! Think solitaire: columns of cards, where cards move within their column
//! and whole columns can be reordered the same way. The outer list holds one
//! node per column; each of those nodes owns the column as a sublist.
//!
//! Two cursors are in play: the outer cursor selects a sublist, and that
//! sublist's own cursor selects the position inside it.

use super::{LinkedList, Node, NodeRef, NodeSpec, Placement};

/// Ragged two-level grid built from [`LinkedList`]s.
///
/// Every outer node caches the id of its sublist's head node in its
/// `payload_id`, which is how the head of each column is found again after
/// the grid has been written to a table.
#[derive(Debug, Clone, Default)]
pub struct NestedList {
    outer: LinkedList,
}

impl NestedList {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the outer list.
    #[must_use]
    pub const fn outer(&self) -> &LinkedList {
        &self.outer
    }

    pub(crate) fn outer_mut(&mut self) -> &mut LinkedList {
        &mut self.outer
    }

    /// Adds an outer node carrying a new, empty sublist.
    ///
    /// Placement follows [`LinkedList::add_node`]; the outer cursor ends on
    /// the new node. Any `payload_id` in `spec` is dropped: an empty sublist
    /// has no head to point at.
    pub fn add_list(&mut self, placement: Placement, spec: NodeSpec) -> NodeRef {
        let spec = NodeSpec {
            payload_id: None,
            sublist: Some(LinkedList::new()),
            ..spec
        };
        self.outer.add_node(placement, spec)
    }

    /// Adds a node to the sublist selected by the outer cursor.
    ///
    /// When the node becomes the sublist's head, its id is copied into the
    /// outer node's `payload_id`. Returns `None` when no outer node is
    /// selected.
    pub fn add_node(&mut self, placement: Placement, spec: NodeSpec) -> Option<NodeRef> {
        let sublist = self.outer.sublist_mut()?;
        let node = sublist.add_node(
            placement,
            NodeSpec {
                sublist: None,
                ..spec
            },
        );
        if sublist.at_head() {
            let head_id = sublist.node_id();
            self.outer.set_payload_id(head_id);
        }
        Some(node)
    }

    /// Cached id of the selected sublist's head.
    #[must_use]
    pub fn head_id(&self) -> Option<i64> {
        self.outer.payload_id()
    }

    /// Recomputes the selected outer node's cached head id from its sublist
    /// and returns it.
    ///
    /// Needed after the sublist head changed through a path that bypassed
    /// [`add_node`](Self::add_node), e.g. a node id assigned later.
    pub fn sync_head_id(&mut self) -> Option<i64> {
        let head_id = self.outer.sublist().and_then(|sublist| {
            sublist
                .head()
                .and_then(|head| sublist.node(head))
                .and_then(Node::id)
        });
        self.outer.set_payload_id(head_id);
        head_id
    }

    /// Deletes `at` (default: the sublist cursor) from the selected sublist
    /// and re-synchronizes the cached head id.
    pub fn delete_node(&mut self, at: Option<NodeRef>) -> Option<Node> {
        let removed = self.outer.sublist_mut()?.delete(at)?;
        self.sync_head_id();
        Some(removed)
    }

    /// Deletes an outer node (default: the outer cursor) together with its
    /// sublist.
    pub fn delete_list(&mut self, at: Option<NodeRef>) -> Option<Node> {
        self.outer.delete(at)
    }

    /// Sublist selected by the outer cursor.
    #[must_use]
    pub fn sublist(&self) -> Option<&LinkedList> {
        self.outer.sublist()
    }

    /// Mutable sublist selected by the outer cursor.
    ///
    /// Structural edits made through this reference skip the cached head id;
    /// follow them with [`sync_head_id`](Self::sync_head_id).
    pub fn sublist_mut(&mut self) -> Option<&mut LinkedList> {
        self.outer.sublist_mut()
    }

    /// Sublist owned by a specific outer node.
    #[must_use]
    pub fn sublist_of(&self, at: NodeRef) -> Option<&LinkedList> {
        self.outer.node(at).and_then(Node::sublist)
    }

    /// Number of outer nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.outer.len()
    }

    /// Returns `true` when there are no outer nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Outer cursor handle.
    #[must_use]
    pub const fn cursor(&self) -> Option<NodeRef> {
        self.outer.cursor()
    }

    /// See [`LinkedList::first`].
    pub fn first(&mut self) -> Option<NodeRef> {
        self.outer.first()
    }

    /// See [`LinkedList::last`].
    pub fn last(&mut self) -> Option<NodeRef> {
        self.outer.last()
    }

    /// See [`LinkedList::next`].
    pub fn next(&mut self) -> Option<NodeRef> {
        self.outer.next()
    }

    /// See [`LinkedList::previous`].
    pub fn previous(&mut self) -> Option<NodeRef> {
        self.outer.previous()
    }

    /// See [`LinkedList::at_head`].
    #[must_use]
    pub fn at_head(&self) -> bool {
        self.outer.at_head()
    }

    /// See [`LinkedList::at_tail`].
    #[must_use]
    pub fn at_tail(&self) -> bool {
        self.outer.at_tail()
    }

    /// See [`LinkedList::find`].
    pub fn find(&mut self, id: i64) -> Option<NodeRef> {
        self.outer.find(id)
    }

    /// See [`LinkedList::find_at`].
    pub fn find_at(&mut self, index: usize) -> Option<NodeRef> {
        self.outer.find_at(index)
    }

    /// See [`LinkedList::set_cursor`].
    pub fn set_cursor(&mut self, at: NodeRef) -> bool {
        self.outer.set_cursor(at)
    }
}
