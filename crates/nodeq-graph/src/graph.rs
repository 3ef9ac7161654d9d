//! Core graph data structure.
//!
//! The Graph owns every node and the two tables that translate between
//! user-facing names and internal identities. Every public operation
//! validates its arguments before touching anything, so a failed call
//! leaves the graph exactly as it was.

use crate::edge::GraphEdge;
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A directed graph of uniquely named nodes.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Live nodes keyed by identity. Iteration order is identity order.
    nodes: BTreeMap<NodeId, Node>,

    /// Maps names to identities.
    id_index: HashMap<String, NodeId>,

    /// Maps identities back to names.
    name_index: HashMap<NodeId, String>,

    /// High-water mark for identity allocation. Never decreases, so a
    /// freed identity is not handed out again.
    next_id: NodeId,
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with zero nodes.
    pub fn create_empty() -> Self {
        Self::new()
    }

    /// Adds a node and returns the identity assigned to it.
    pub fn add_node(&mut self, name: &str) -> Result<NodeId> {
        validate_name(name)?;
        if self.id_index.contains_key(name) {
            return Err(GraphError::DuplicateName(name.to_string()));
        }

        let id = self.next_id;
        self.register(name, id);
        Ok(id)
    }

    /// Removes a node along with every edge touching it.
    pub fn remove_node(&mut self, name: &str) -> Result<()> {
        let id = self.resolve(name)?;
        let node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| GraphError::UnknownName(name.to_string()))?;

        for parent in node.parents().filter(|&p| p != id) {
            if let Some(neighbor) = self.nodes.get_mut(&parent) {
                neighbor.remove_child(id);
            }
        }
        for child in node.children().filter(|&c| c != id) {
            if let Some(neighbor) = self.nodes.get_mut(&child) {
                neighbor.remove_parent(id);
            }
        }

        self.id_index.remove(name);
        self.name_index.remove(&id);
        Ok(())
    }

    /// Names of the nodes `name` points to.
    pub fn get_children(&self, name: &str) -> Result<BTreeSet<String>> {
        let node = self.node(name)?;
        Ok(self.names_of(node.children()))
    }

    /// Names of the nodes pointing to `name`.
    pub fn get_parents(&self, name: &str) -> Result<BTreeSet<String>> {
        let node = self.node(name)?;
        Ok(self.names_of(node.parents()))
    }

    /// Adds the edge `from -> to`.
    ///
    /// Returns false if the edge was already there.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        let (from_id, to_id) = (self.resolve(from)?, self.resolve(to)?);
        if self.edge_state(from_id, to_id)? {
            return Ok(false);
        }
        Ok(self.link(from_id, to_id))
    }

    /// Removes the edge `from -> to`.
    ///
    /// Returns false if there was no such edge.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        let (from_id, to_id) = (self.resolve(from)?, self.resolve(to)?);
        if !self.edge_state(from_id, to_id)? {
            return Ok(false);
        }

        let removed_out = self
            .nodes
            .get_mut(&from_id)
            .is_some_and(|n| n.remove_child(to_id));
        let removed_in = self
            .nodes
            .get_mut(&to_id)
            .is_some_and(|n| n.remove_parent(from_id));
        Ok(removed_out && removed_in)
    }

    /// Checks whether `from -> to` exists.
    pub fn is_edge(&self, from: &str, to: &str) -> Result<bool> {
        let to_id = self.resolve(to)?;
        Ok(self.node(from)?.has_child(to_id))
    }

    /// All registered names.
    pub fn get_all_nodes(&self) -> BTreeSet<String> {
        self.id_index.keys().cloned().collect()
    }

    /// Returns true if a node with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.id_index.contains_key(name)
    }

    /// Returns the identity registered for a name.
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.id_index.get(name).copied()
    }

    /// Returns the name registered for an identity.
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.name_index.get(&id).map(String::as_str)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Node::out_degree).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over `(name, node)` pairs in identity order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| Some((self.name_of(*id)?, node)))
    }

    /// Returns all edges by name, in identity order of their sources.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.nodes()
            .flat_map(|(source, node)| {
                node.children()
                    .filter_map(|child| self.name_of(child))
                    .map(move |target| GraphEdge::new(source, target))
            })
            .collect()
    }

    /// Returns a serializable copy of the graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().map(|(name, _)| name.to_string()).collect(),
            edges: self.export_edges(),
        }
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            self_loops: self
                .nodes
                .iter()
                .filter(|(id, node)| node.has_child(**id))
                .count(),
        }
    }

    /// Registers a node under a caller-chosen identity.
    ///
    /// The caller guarantees that neither the name nor the identity is in use.
    pub(crate) fn register(&mut self, name: &str, id: NodeId) {
        self.nodes.insert(id, Node::new(id));
        self.id_index.insert(name.to_string(), id);
        self.name_index.insert(id, name.to_string());
        self.next_id = self.next_id.max(id + 1);
    }

    /// Records `from -> to` on both sides. Both identities must be live.
    pub(crate) fn link(&mut self, from: NodeId, to: NodeId) -> bool {
        let added_out = self
            .nodes
            .get_mut(&from)
            .is_some_and(|n| n.add_child(to));
        let added_in = self
            .nodes
            .get_mut(&to)
            .is_some_and(|n| n.add_parent(from));
        added_out && added_in
    }

    fn resolve(&self, name: &str) -> Result<NodeId> {
        self.id_of(name)
            .ok_or_else(|| GraphError::UnknownName(name.to_string()))
    }

    fn node(&self, name: &str) -> Result<&Node> {
        self.id_of(name)
            .and_then(|id| self.nodes.get(&id))
            .ok_or_else(|| GraphError::UnknownName(name.to_string()))
    }

    /// Reports whether `from -> to` is present, failing if the two
    /// adjacency sets disagree.
    fn edge_state(&self, from: NodeId, to: NodeId) -> Result<bool> {
        let outgoing = self.nodes.get(&from).is_some_and(|n| n.has_child(to));
        let incoming = self.nodes.get(&to).is_some_and(|n| n.has_parent(from));
        if outgoing != incoming {
            return Err(GraphError::Inconsistent { from, to });
        }
        Ok(outgoing)
    }

    fn names_of(&self, ids: impl Iterator<Item = NodeId>) -> BTreeSet<String> {
        ids.filter_map(|id| self.name_of(id))
            .map(str::to_string)
            .collect()
    }
}

/// Names must survive a round trip through the line-oriented file format.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(&['\n', '\r'][..]) {
        return Err(GraphError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Graph statistics for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub self_loops: usize,
}

/// Serializable view of a graph, keyed by names only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<String>,
    pub edges: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(names: &[&str]) -> Graph {
        let mut graph = Graph::create_empty();
        for name in names {
            graph.add_node(name).unwrap();
        }
        graph
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_two_node_scenario() {
        let mut graph = graph_with(&["A", "B"]);

        assert!(graph.add_edge("A", "B").unwrap());
        assert!(graph.is_edge("A", "B").unwrap());
        assert!(!graph.is_edge("B", "A").unwrap());
        assert_eq!(graph.get_children("A").unwrap(), set(&["B"]));
        assert_eq!(graph.get_parents("B").unwrap(), set(&["A"]));
        assert_eq!(graph.get_all_nodes(), set(&["A", "B"]));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut graph = graph_with(&["A"]);

        let err = graph.add_node("A").unwrap_err();
        assert!(matches!(err, GraphError::DuplicateName(ref n) if n == "A"));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut graph = Graph::new();

        assert!(matches!(graph.add_node(""), Err(GraphError::InvalidName(_))));
        assert!(matches!(
            graph.add_node("two\nlines"),
            Err(GraphError::InvalidName(_))
        ));
        assert!(graph.is_empty());

        // Spaces are fine, a name occupies a whole line.
        graph.add_node("has spaces").unwrap();
        assert!(graph.contains("has spaces"));
    }

    #[test]
    fn test_unknown_name_leaves_graph_unchanged() {
        let mut graph = graph_with(&["A"]);

        assert!(matches!(
            graph.add_edge("A", "Z"),
            Err(GraphError::UnknownName(ref n)) if n == "Z"
        ));
        assert!(matches!(
            graph.add_edge("Z", "A"),
            Err(GraphError::UnknownName(_))
        ));
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.get_children("A").unwrap().is_empty());
        assert!(matches!(
            graph.get_children("Z"),
            Err(GraphError::UnknownName(_))
        ));
        assert!(matches!(
            graph.remove_node("Z"),
            Err(GraphError::UnknownName(_))
        ));
        assert!(matches!(
            graph.is_edge("A", "Z"),
            Err(GraphError::UnknownName(_))
        ));
        assert_eq!(graph.get_all_nodes(), set(&["A"]));
    }

    #[test]
    fn test_add_edge_twice_returns_false() {
        let mut graph = graph_with(&["A", "B"]);

        assert!(graph.add_edge("A", "B").unwrap());
        assert!(!graph.add_edge("A", "B").unwrap());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = graph_with(&["A", "B"]);
        graph.add_edge("A", "B").unwrap();

        assert!(graph.remove_edge("A", "B").unwrap());
        assert!(!graph.is_edge("A", "B").unwrap());
        assert!(!graph.remove_edge("A", "B").unwrap());
        assert!(graph.get_parents("B").unwrap().is_empty());
    }

    #[test]
    fn test_remove_node_severs_edges() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A", "B").unwrap();
        graph.add_edge("C", "A").unwrap();
        graph.add_edge("C", "B").unwrap();

        graph.remove_node("A").unwrap();

        assert_eq!(graph.get_all_nodes(), set(&["B", "C"]));
        assert_eq!(graph.get_parents("B").unwrap(), set(&["C"]));
        assert_eq!(graph.get_children("C").unwrap(), set(&["B"]));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.id_of("A").is_none());
        assert!(matches!(
            graph.is_edge("C", "A"),
            Err(GraphError::UnknownName(_))
        ));
    }

    #[test]
    fn test_self_loop() {
        let mut graph = graph_with(&["A"]);

        assert!(graph.add_edge("A", "A").unwrap());
        assert!(graph.is_edge("A", "A").unwrap());
        assert_eq!(graph.get_parents("A").unwrap(), set(&["A"]));
        assert_eq!(graph.stats().self_loops, 1);

        graph.remove_node("A").unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_identities_not_reused_after_delete() {
        let mut graph = graph_with(&["A", "B", "C"]);
        let c = graph.id_of("C").unwrap();
        graph.add_edge("A", "C").unwrap();

        graph.remove_node("B").unwrap();
        let d = graph.add_node("D").unwrap();

        assert_ne!(d, c);
        assert_eq!(graph.name_of(c), Some("C"));
        assert_eq!(graph.get_children("A").unwrap(), set(&["C"]));
        assert!(graph.get_parents("D").unwrap().is_empty());
    }

    #[test]
    fn test_readding_removed_name() {
        let mut graph = graph_with(&["A", "B"]);
        graph.add_edge("A", "B").unwrap();
        graph.remove_node("B").unwrap();

        graph.add_node("B").unwrap();
        assert!(!graph.is_edge("A", "B").unwrap());
        assert!(graph.get_children("A").unwrap().is_empty());
    }

    #[test]
    fn test_inconsistent_edge_detected() {
        let mut graph = graph_with(&["A", "B"]);
        let (a, b) = (graph.id_of("A").unwrap(), graph.id_of("B").unwrap());
        graph.nodes.get_mut(&a).unwrap().add_child(b);

        assert!(matches!(
            graph.add_edge("A", "B"),
            Err(GraphError::Inconsistent { .. })
        ));
        assert!(matches!(
            graph.remove_edge("A", "B"),
            Err(GraphError::Inconsistent { .. })
        ));
        // Nothing was touched by the failed calls.
        assert!(!graph.nodes[&b].has_parent(a));
        assert!(graph.nodes[&a].has_child(b));
    }

    #[test]
    fn test_snapshot() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A", "C").unwrap();
        graph.add_edge("B", "A").unwrap();

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.nodes, vec!["A", "B", "C"]);
        assert_eq!(
            snapshot.edges,
            vec![GraphEdge::new("A", "C"), GraphEdge::new("B", "A")]
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["edges"][0]["source"], "A");
        assert_eq!(json["edges"][0]["target"], "C");
    }
}
