//! Cursor-navigated doubly linked lists.
//!
//! [`LinkedList`] keeps its nodes in an arena and links them through
//! [`NodeRef`] handles, so `next`/`prev` never borrow each other. Every list
//! carries a single cursor that positional operations act on.
//!
//! [`NestedList`] builds a ragged two-level grid out of it: every outer node
//! owns a sublist, and the outer node caches the id of that sublist's head.
//!
//! # Navigation contract
//!
//! Moving past either end, or reading through an empty list, never fails: the
//! call returns `None` (or `false`, or an empty label) and leaves the cursor
//! where it was.

mod nested;
mod node;

pub use nested::NestedList;
pub use node::{Node, NodeRef, NodeSpec, Placement};

/// Arena slot. The generation is bumped every time the slot is vacated.
#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Doubly linked list with a movable cursor.
///
/// # Example
///
/// ```rust
/// use nestlist::list::{LinkedList, NodeSpec, Placement};
///
/// let mut list = LinkedList::new();
/// list.add_node(Placement::Append, NodeSpec::labeled("b"));
/// list.first();
/// list.add_node(Placement::BeforeCursor, NodeSpec::labeled("a"));
/// assert_eq!(list.labels(), vec!["a", "b"]);
/// assert!(list.at_head());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinkedList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: Option<NodeRef>,
    tail: Option<NodeRef>,
    cursor: Option<NodeRef>,
    len: usize,
}

impl LinkedList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of linked nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the list holds no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Head node handle.
    #[must_use]
    pub const fn head(&self) -> Option<NodeRef> {
        self.head
    }

    /// Tail node handle.
    #[must_use]
    pub const fn tail(&self) -> Option<NodeRef> {
        self.tail
    }

    /// Cursor node handle.
    #[must_use]
    pub const fn cursor(&self) -> Option<NodeRef> {
        self.cursor
    }

    /// Resolves a handle. Stale handles resolve to `None`.
    #[must_use]
    pub fn node(&self, at: NodeRef) -> Option<&Node> {
        self.slots
            .get(at.index)
            .filter(|slot| slot.generation == at.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Resolves a handle mutably. Stale handles resolve to `None`.
    pub fn node_mut(&mut self, at: NodeRef) -> Option<&mut Node> {
        self.slots
            .get_mut(at.index)
            .filter(|slot| slot.generation == at.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Moves the cursor onto `at`. Returns `false` for a stale handle.
    pub fn set_cursor(&mut self, at: NodeRef) -> bool {
        if self.node(at).is_none() {
            return false;
        }
        self.cursor = Some(at);
        true
    }

    /// Creates a node and links it into the list.
    ///
    /// An empty list takes the node as head, tail and cursor.
    /// [`Placement::Append`] links it after the tail;
    /// [`Placement::BeforeCursor`] links it immediately before the cursor
    /// node, making it the new head when the cursor was at head. The cursor
    /// always ends on the new node.
    pub fn add_node(&mut self, placement: Placement, spec: NodeSpec) -> NodeRef {
        let node = self.alloc(Node::from(spec));

        match (self.head, self.tail) {
            (Some(head), Some(tail)) => match placement {
                Placement::Append => {
                    self.set_prev(node, Some(tail));
                    self.set_next(tail, Some(node));
                    self.tail = Some(node);
                },
                Placement::BeforeCursor => {
                    let after = self.cursor.unwrap_or(head);
                    let before = self.node(after).and_then(Node::prev);
                    self.set_next(node, Some(after));
                    self.set_prev(node, before);
                    self.set_prev(after, Some(node));
                    match before {
                        Some(before) => self.set_next(before, Some(node)),
                        None => self.head = Some(node),
                    }
                },
            },
            _ => {
                self.head = Some(node);
                self.tail = Some(node);
            },
        }

        self.cursor = Some(node);
        self.len += 1;
        node
    }

    /// Returns `true` when the cursor is on the head node.
    #[must_use]
    pub fn at_head(&self) -> bool {
        self.cursor.is_some() && self.cursor == self.head
    }

    /// Returns `true` when the cursor is on the tail node.
    #[must_use]
    pub fn at_tail(&self) -> bool {
        self.cursor.is_some() && self.cursor == self.tail
    }

    /// Moves the cursor to the head.
    pub fn first(&mut self) -> Option<NodeRef> {
        if self.head.is_some() {
            self.cursor = self.head;
        }
        self.head
    }

    /// Moves the cursor to the tail.
    pub fn last(&mut self) -> Option<NodeRef> {
        if self.tail.is_some() {
            self.cursor = self.tail;
        }
        self.tail
    }

    /// Steps the cursor forward. Stays put at the tail.
    pub fn next(&mut self) -> Option<NodeRef> {
        let next = self.cursor.and_then(|at| self.node(at)).and_then(Node::next)?;
        self.cursor = Some(next);
        Some(next)
    }

    /// Steps the cursor backward. Stays put at the head.
    pub fn previous(&mut self) -> Option<NodeRef> {
        let prev = self.cursor.and_then(|at| self.node(at)).and_then(Node::prev)?;
        self.cursor = Some(prev);
        Some(prev)
    }

    /// Moves the cursor to the first node whose id equals `id`.
    ///
    /// Equality is by id only. On failure the cursor is restored.
    pub fn find(&mut self, id: i64) -> Option<NodeRef> {
        let saved = self.cursor;
        let mut at = self.first();
        while let Some(current) = at {
            if self.node(current).and_then(Node::id) == Some(id) {
                return Some(current);
            }
            at = self.next();
        }
        self.cursor = saved;
        None
    }

    /// Same as [`find`](Self::find), taking the id from `node`, which may
    /// belong to another list. A node without an id is never found.
    pub fn find_node(&mut self, node: &Node) -> Option<NodeRef> {
        node.id().and_then(|id| self.find(id))
    }

    /// Moves the cursor to the zero-based `index`. On failure the cursor is
    /// restored.
    pub fn find_at(&mut self, index: usize) -> Option<NodeRef> {
        let saved = self.cursor;
        let mut at = self.first();
        let mut position = 0;
        while let Some(current) = at {
            if position == index {
                return Some(current);
            }
            position += 1;
            at = self.next();
        }
        self.cursor = saved;
        None
    }

    /// Unlinks `at` (default: the cursor node) and returns it detached.
    ///
    /// Deleting the head moves the cursor to the new head, deleting the tail
    /// moves it to the new tail, and deleting an interior node moves it to
    /// that node's former successor. Returns `None` when there is nothing to
    /// delete or the handle is stale.
    pub fn delete(&mut self, at: Option<NodeRef>) -> Option<Node> {
        let target = at.or(self.cursor)?;
        let (prev, next) = self.node(target).map(|n| (n.prev, n.next))?;

        if Some(target) == self.head {
            self.head = next;
            match next {
                Some(next) => self.set_prev(next, None),
                None => self.tail = None,
            }
            self.cursor = self.head;
        } else if Some(target) == self.tail {
            self.tail = prev;
            if let Some(prev) = prev {
                self.set_next(prev, None);
            }
            self.cursor = self.tail;
        } else {
            if let Some(prev) = prev {
                self.set_next(prev, next);
            }
            if let Some(next) = next {
                self.set_prev(next, prev);
            }
            self.cursor = next;
        }

        self.len -= 1;
        let mut node = self.release(target)?;
        node.next = None;
        node.prev = None;
        Some(node)
    }

    /// Label at the cursor, or `""` for an empty list.
    #[must_use]
    pub fn label(&self) -> &str {
        self.current().map_or("", Node::label)
    }

    /// Replaces the label at the cursor.
    pub fn set_label(&mut self, label: impl Into<String>) {
        if let Some(node) = self.current_mut() {
            node.set_label(label);
        }
    }

    /// Payload id at the cursor.
    #[must_use]
    pub fn payload_id(&self) -> Option<i64> {
        self.current().and_then(Node::payload_id)
    }

    /// Replaces the payload id at the cursor.
    pub fn set_payload_id(&mut self, payload_id: Option<i64>) {
        if let Some(node) = self.current_mut() {
            node.set_payload_id(payload_id);
        }
    }

    /// Record id at the cursor.
    #[must_use]
    pub fn node_id(&self) -> Option<i64> {
        self.current().and_then(Node::id)
    }

    /// Replaces the record id at the cursor.
    pub fn set_node_id(&mut self, id: Option<i64>) {
        if let Some(node) = self.current_mut() {
            node.set_id(id);
        }
    }

    /// Sublist at the cursor.
    #[must_use]
    pub fn sublist(&self) -> Option<&Self> {
        self.current().and_then(Node::sublist)
    }

    /// Mutable sublist at the cursor.
    pub fn sublist_mut(&mut self) -> Option<&mut Self> {
        self.current_mut().and_then(Node::sublist_mut)
    }

    /// Replaces the sublist at the cursor.
    pub fn set_sublist(&mut self, sublist: Option<Self>) {
        if let Some(node) = self.current_mut() {
            node.set_sublist(sublist);
        }
    }

    /// Iterates head to tail without touching the cursor.
    #[must_use]
    pub const fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            at: self.head,
            forward: true,
        }
    }

    /// Iterates tail to head without touching the cursor.
    #[must_use]
    pub const fn iter_rev(&self) -> Iter<'_> {
        Iter {
            list: self,
            at: self.tail,
            forward: false,
        }
    }

    /// Labels head to tail.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.iter().map(|(_, node)| node.label()).collect()
    }

    /// Record ids head to tail.
    #[must_use]
    pub fn ids(&self) -> Vec<Option<i64>> {
        self.iter().map(|(_, node)| node.id()).collect()
    }

    fn current(&self) -> Option<&Node> {
        self.cursor.and_then(|at| self.node(at))
    }

    fn current_mut(&mut self) -> Option<&mut Node> {
        let at = self.cursor?;
        self.node_mut(at)
    }

    fn set_next(&mut self, at: NodeRef, next: Option<NodeRef>) {
        if let Some(node) = self.node_mut(at) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, at: NodeRef, prev: Option<NodeRef>) {
        if let Some(node) = self.node_mut(at) {
            node.prev = prev;
        }
    }

    fn alloc(&mut self, node: Node) -> NodeRef {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeRef {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeRef {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn release(&mut self, at: NodeRef) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(at.index)
            .filter(|slot| slot.generation == at.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(at.index);
        Some(node)
    }
}

/// Borrowing iterator over `(handle, node)` pairs.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    list: &'a LinkedList,
    at: Option<NodeRef>,
    forward: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeRef, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.at?;
        let node = self.list.node(at)?;
        self.at = if self.forward { node.next } else { node.prev };
        Some((at, node))
    }
}

impl<'a> IntoIterator for &'a LinkedList {
    type Item = (NodeRef, &'a Node);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cursor-only view of a list.
///
/// Handed out by the persistent lists so callers can move the cursor and read
/// nodes without being able to change structure behind the store's back.
#[derive(Debug)]
pub struct Navigator<'a> {
    list: &'a mut LinkedList,
}

impl<'a> Navigator<'a> {
    /// Wraps a list.
    pub const fn new(list: &'a mut LinkedList) -> Self {
        Self { list }
    }

    /// Read access to the underlying list.
    #[must_use]
    pub fn list(&self) -> &LinkedList {
        self.list
    }

    /// See [`LinkedList::first`].
    pub fn first(&mut self) -> Option<NodeRef> {
        self.list.first()
    }

    /// See [`LinkedList::last`].
    pub fn last(&mut self) -> Option<NodeRef> {
        self.list.last()
    }

    /// See [`LinkedList::next`].
    pub fn next(&mut self) -> Option<NodeRef> {
        self.list.next()
    }

    /// See [`LinkedList::previous`].
    pub fn previous(&mut self) -> Option<NodeRef> {
        self.list.previous()
    }

    /// See [`LinkedList::at_head`].
    #[must_use]
    pub fn at_head(&self) -> bool {
        self.list.at_head()
    }

    /// See [`LinkedList::at_tail`].
    #[must_use]
    pub fn at_tail(&self) -> bool {
        self.list.at_tail()
    }

    /// See [`LinkedList::find`].
    pub fn find(&mut self, id: i64) -> Option<NodeRef> {
        self.list.find(id)
    }

    /// See [`LinkedList::find_at`].
    pub fn find_at(&mut self, index: usize) -> Option<NodeRef> {
        self.list.find_at(index)
    }

    /// See [`LinkedList::set_cursor`].
    pub fn set_cursor(&mut self, at: NodeRef) -> bool {
        self.list.set_cursor(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(labels: &[(&str, i64)]) -> LinkedList {
        let mut list = LinkedList::new();
        for (label, id) in labels {
            list.add_node(Placement::Append, NodeSpec::labeled(*label).with_id(*id));
        }
        list
    }

    fn assert_links_consistent(list: &LinkedList) {
        let nodes: Vec<_> = list.iter().collect();
        assert_eq!(nodes.len(), list.len());
        for pair in nodes.windows(2) {
            let (a, a_node) = pair[0];
            let (b, b_node) = pair[1];
            assert_eq!(a_node.next(), Some(b));
            assert_eq!(b_node.prev(), Some(a));
        }
        if let Some((_, head)) = nodes.first() {
            assert!(head.prev().is_none());
        }
        if let Some((_, tail)) = nodes.last() {
            assert!(tail.next().is_none());
        }
    }

    #[test]
    fn test_empty_list() {
        let mut list = LinkedList::new();
        assert!(list.is_empty());
        assert!(list.head().is_none());
        assert!(list.tail().is_none());
        assert!(list.cursor().is_none());
        assert!(list.first().is_none());
        assert!(list.last().is_none());
        assert!(list.next().is_none());
        assert!(list.previous().is_none());
        assert!(!list.at_head());
        assert!(!list.at_tail());
        assert_eq!(list.label(), "");
        assert!(list.node_id().is_none());
        assert!(list.payload_id().is_none());
        assert!(list.sublist().is_none());
        assert!(list.delete(None).is_none());
    }

    #[test]
    fn test_append_links_nodes() {
        let mut list = LinkedList::new();
        let node1 = list.add_node(Placement::Append, NodeSpec::labeled("node-1"));
        assert_eq!(list.head(), Some(node1));
        assert_eq!(list.tail(), Some(node1));
        assert_eq!(list.cursor(), Some(node1));
        assert!(list.node_id().is_none());

        let node2 = list.add_node(
            Placement::Append,
            NodeSpec::labeled("node-2")
                .with_id(222)
                .with_payload_id(11111),
        );
        assert_eq!(list.head(), Some(node1));
        assert_eq!(list.tail(), Some(node2));
        assert_eq!(list.cursor(), Some(node2));
        assert_eq!(list.payload_id(), Some(11111));

        let node3 = list.add_node(
            Placement::Append,
            NodeSpec::labeled("node-3")
                .with_id(333)
                .with_sublist(LinkedList::new()),
        );
        assert_eq!(list.tail(), Some(node3));
        assert!(list.sublist().is_some());
        assert_eq!(list.node(node1).and_then(Node::next), Some(node2));
        assert_eq!(list.node(node3).and_then(Node::prev), Some(node2));
        assert_eq!(list.labels(), vec!["node-1", "node-2", "node-3"]);
        assert_links_consistent(&list);
    }

    #[test]
    fn test_next_and_previous_stop_at_ends() {
        let mut list = list_of(&[("node-1", 111), ("node-2", 222), ("node-3", 333)]);
        list.first();
        assert!(list.at_head());
        assert!(list.previous().is_none());
        assert_eq!(list.node_id(), Some(111));
        assert!(list.next().is_some());
        assert_eq!(list.node_id(), Some(222));
        assert!(list.next().is_some());
        assert!(list.next().is_none());
        assert_eq!(list.node_id(), Some(333));
        assert!(list.at_tail());

        assert!(list.previous().is_some());
        assert!(list.previous().is_some());
        assert!(list.previous().is_none());
        assert_eq!(list.node_id(), Some(111));
    }

    #[test]
    fn test_cursor_accessors() {
        let mut list = list_of(&[("node-1", 111)]);
        list.set_label("node-1a");
        assert_eq!(list.label(), "node-1a");
        list.set_node_id(Some(999));
        assert_eq!(list.node_id(), Some(999));
        list.set_payload_id(Some(7));
        assert_eq!(list.payload_id(), Some(7));
        list.set_sublist(Some(LinkedList::new()));
        assert!(list.sublist_mut().is_some());
    }

    #[test]
    fn test_insert_before_cursor() {
        let mut list = list_of(&[("node-2", 222), ("node-3", 333)]);
        list.first();
        let node1 = list.add_node(Placement::BeforeCursor, NodeSpec::labeled("node-1").with_id(111));
        assert!(list.at_head());
        assert_eq!(list.head(), Some(node1));
        assert_eq!(list.cursor(), Some(node1));

        list.last();
        list.add_node(Placement::BeforeCursor, NodeSpec::labeled("node-2.5").with_id(250));
        assert_eq!(list.node_id(), Some(250));
        assert_eq!(list.tail().and_then(|t| list.node(t)).and_then(Node::id), Some(333));
        assert_eq!(list.labels(), vec!["node-1", "node-2", "node-2.5", "node-3"]);
        assert_links_consistent(&list);
    }

    #[test]
    fn test_delete_interior_moves_cursor_to_next() {
        let mut list = list_of(&[("1", 1), ("2", 2), ("3", 3)]);
        list.find(2);
        let removed = list.delete(None).expect("node 2 removed");
        assert_eq!(removed.id(), Some(2));
        assert!(removed.next().is_none());
        assert!(removed.prev().is_none());

        assert_eq!(list.node_id(), Some(3));
        let head = list.head().expect("head");
        let tail = list.tail().expect("tail");
        assert_eq!(list.node(head).and_then(Node::next), Some(tail));
        assert_eq!(list.node(tail).and_then(Node::prev), Some(head));
        assert_eq!(list.ids(), vec![Some(1), Some(3)]);
        assert_links_consistent(&list);
    }

    #[test]
    fn test_delete_head_and_tail() {
        let mut list = list_of(&[("1", 1), ("2", 2), ("3", 3), ("4", 4)]);
        list.first();
        list.delete(None);
        assert!(list.at_head());
        assert_eq!(list.node_id(), Some(2));

        list.last();
        list.delete(None);
        assert!(list.at_tail());
        assert_eq!(list.node_id(), Some(3));
        assert!(list.tail().and_then(|t| list.node(t)).and_then(Node::next).is_none());
        assert_eq!(list.ids(), vec![Some(2), Some(3)]);
        assert_links_consistent(&list);
    }

    #[test]
    fn test_delete_at_node() {
        let mut list = list_of(&[("3", 3), ("4", 4), ("5", 5)]);
        list.first();
        let four = list.find(4).expect("node 4");
        list.first();
        list.delete(Some(four));
        assert_eq!(list.node_id(), Some(5));
        assert_eq!(list.ids(), vec![Some(3), Some(5)]);
    }

    #[test]
    fn test_delete_last_remaining_node() {
        let mut list = list_of(&[("only", 1)]);
        assert!(list.delete(None).is_some());
        assert!(list.is_empty());
        assert!(list.tail().is_none());
        assert!(list.cursor().is_none());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut list = list_of(&[("1", 1), ("2", 2)]);
        let first = list.head().expect("head");
        list.delete(Some(first));
        assert!(list.node(first).is_none());
        assert!(list.delete(Some(first)).is_none());
        assert!(!list.set_cursor(first));

        // the freed slot is reused without reviving the old handle
        let fresh = list.add_node(Placement::Append, NodeSpec::labeled("3"));
        assert_eq!(fresh.index, first.index);
        assert!(list.node(first).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_find_restores_cursor_on_miss() {
        let mut list = list_of(&[("1", 111), ("2", 222), ("3", 333)]);
        list.find(222);
        assert!(list.find(999).is_none());
        assert_eq!(list.node_id(), Some(222));
        assert!(list.find_at(3).is_none());
        assert_eq!(list.node_id(), Some(222));
    }

    #[test]
    fn test_find_by_foreign_node() {
        let mut list = list_of(&[("1", 111), ("2", 222)]);
        let alien = Node::from(NodeSpec::labeled("other contents").with_id(222));
        assert!(list.find_node(&alien).is_some());
        assert_eq!(list.label(), "2");

        let unsaved = Node::from(NodeSpec::labeled("no id"));
        list.first();
        assert!(list.find_node(&unsaved).is_none());
        assert_eq!(list.node_id(), Some(111));
    }

    #[test]
    fn test_find_at_each_index() {
        let mut list = list_of(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]);
        for (index, id) in [(3, 4), (1, 2), (4, 5), (2, 3), (0, 1)] {
            assert!(list.find_at(index).is_some());
            assert_eq!(list.node_id(), Some(id));
        }
    }

    #[test]
    fn test_iter_rev() {
        let list = list_of(&[("a", 1), ("b", 2), ("c", 3)]);
        let labels: Vec<_> = list.iter_rev().map(|(_, n)| n.label()).collect();
        assert_eq!(labels, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_navigator_moves_cursor() {
        let mut list = list_of(&[("a", 1), ("b", 2)]);
        let mut nav = Navigator::new(&mut list);
        nav.first();
        assert!(nav.at_head());
        nav.next();
        assert!(nav.at_tail());
        assert_eq!(nav.list().label(), "b");
        assert!(nav.find(1).is_some());
        assert_eq!(list.label(), "a");
    }
}
