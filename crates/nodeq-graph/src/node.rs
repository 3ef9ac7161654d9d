//! Graph vertices.
//!
//! A node only knows identities. Whether an identity is alive is the
//! graph's business, so nothing here validates its arguments.

use std::collections::BTreeSet;

/// Identity of a node inside a [`Graph`](crate::Graph).
pub type NodeId = usize;

/// A vertex with its outgoing and incoming neighbor identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,

    /// Identities this node points to.
    outgoing: BTreeSet<NodeId>,

    /// Identities pointing to this node.
    incoming: BTreeSet<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            outgoing: BTreeSet::new(),
            incoming: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn has_child(&self, id: NodeId) -> bool {
        self.outgoing.contains(&id)
    }

    pub fn has_parent(&self, id: NodeId) -> bool {
        self.incoming.contains(&id)
    }

    /// Records an outgoing edge. Returns false if it was already there.
    pub fn add_child(&mut self, id: NodeId) -> bool {
        self.outgoing.insert(id)
    }

    /// Records an incoming edge. Returns false if it was already there.
    pub fn add_parent(&mut self, id: NodeId) -> bool {
        self.incoming.insert(id)
    }

    pub fn remove_child(&mut self, id: NodeId) -> bool {
        self.outgoing.remove(&id)
    }

    pub fn remove_parent(&mut self, id: NodeId) -> bool {
        self.incoming.remove(&id)
    }

    /// Outgoing identities in ascending order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing.iter().copied()
    }

    /// Incoming identities in ascending order.
    pub fn parents(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming.iter().copied()
    }

    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_child_is_idempotent() {
        let mut node = Node::new(0);

        assert!(node.add_child(3));
        assert!(!node.add_child(3));
        assert!(node.has_child(3));
        assert_eq!(node.out_degree(), 1);
        assert!(!node.has_parent(3));
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut node = Node::new(1);
        node.add_parent(4);

        assert!(node.remove_parent(4));
        assert!(!node.remove_parent(4));
        assert!(!node.remove_child(4));
        assert_eq!(node.in_degree(), 0);
    }

    #[test]
    fn test_children_are_sorted() {
        let mut node = Node::new(0);
        node.add_child(7);
        node.add_child(2);
        node.add_child(5);

        assert_eq!(node.children().collect::<Vec<_>>(), vec![2, 5, 7]);
    }
}
