//! List node, arena handle, and insertion descriptors.

use super::LinkedList;

/// Handle to a node stored in a [`LinkedList`] arena.
///
/// A handle carries the slot index plus the slot generation at the time the
/// node was created. Once the node is deleted the slot generation moves on,
/// so the handle becomes stale and every lookup through it returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

/// Where [`LinkedList::add_node`] places a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Insert immediately before the cursor node.
    #[default]
    BeforeCursor,
    /// Link after the tail.
    Append,
}

/// One list element.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) id: Option<i64>,
    pub(crate) next: Option<NodeRef>,
    pub(crate) prev: Option<NodeRef>,
    pub(crate) payload_id: Option<i64>,
    pub(crate) sublist: Option<LinkedList>,
    pub(crate) label: String,
}

impl Node {
    /// Record id, or `None` for a node that has never been written.
    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    /// Following node in the same list.
    #[must_use]
    pub const fn next(&self) -> Option<NodeRef> {
        self.next
    }

    /// Preceding node in the same list.
    #[must_use]
    pub const fn prev(&self) -> Option<NodeRef> {
        self.prev
    }

    /// Opaque foreign key. On an outer nested-list node this caches the id
    /// of the sublist head.
    #[must_use]
    pub const fn payload_id(&self) -> Option<i64> {
        self.payload_id
    }

    /// Owned nested list, if any.
    #[must_use]
    pub const fn sublist(&self) -> Option<&LinkedList> {
        self.sublist.as_ref()
    }

    /// Mutable access to the owned nested list.
    pub fn sublist_mut(&mut self) -> Option<&mut LinkedList> {
        self.sublist.as_mut()
    }

    /// Free-form label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replaces the record id.
    pub fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    /// Replaces the payload id.
    pub fn set_payload_id(&mut self, payload_id: Option<i64>) {
        self.payload_id = payload_id;
    }

    /// Replaces the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Replaces the nested list.
    pub fn set_sublist(&mut self, sublist: Option<LinkedList>) {
        self.sublist = sublist;
    }

    /// Takes the nested list out of the node.
    pub fn take_sublist(&mut self) -> Option<LinkedList> {
        self.sublist.take()
    }
}

impl From<NodeSpec> for Node {
    fn from(spec: NodeSpec) -> Self {
        Self {
            id: spec.id,
            next: None,
            prev: None,
            payload_id: spec.payload_id,
            sublist: spec.sublist,
            label: spec.label,
        }
    }
}

/// Contents of a node about to be inserted.
///
/// # Example
///
/// ```rust
/// use nestlist::list::{LinkedList, NodeSpec, Placement};
///
/// let mut list = LinkedList::new();
/// list.add_node(Placement::Append, NodeSpec::labeled("node-1").with_id(111));
/// assert_eq!(list.node_id(), Some(111));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    /// Preassigned record id.
    pub id: Option<i64>,
    /// Opaque foreign key.
    pub payload_id: Option<i64>,
    /// Nested list owned by the node.
    pub sublist: Option<LinkedList>,
    /// Free-form label.
    pub label: String,
}

impl NodeSpec {
    /// Creates a spec with only a label set.
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Sets the record id.
    #[must_use]
    pub const fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the payload id.
    #[must_use]
    pub const fn with_payload_id(mut self, payload_id: i64) -> Self {
        self.payload_id = Some(payload_id);
        self
    }

    /// Attaches a nested list.
    #[must_use]
    pub fn with_sublist(mut self, sublist: LinkedList) -> Self {
        self.sublist = Some(sublist);
        self
    }
}
