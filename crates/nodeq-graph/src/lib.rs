//! nodeq Graph - named directed graph
//!
//! This crate owns the graph that the `nodeq` shell edits. Nodes are
//! addressed by name from the outside and by a small integer identity
//! on the inside.
//!
//! # Architecture
//!
//! - [`Node`] keeps the identities it points to and the ones pointing at it.
//! - [`Graph`] owns every node plus the name/identity tables, and keeps the
//!   two adjacency directions in sync on every mutation.
//! - [`store`] reads and writes the plain text file format.
//!
//! The crate never prints or logs; every failure comes back as a
//! [`GraphError`].
//!
//! # Example
//!
//! ```
//! use nodeq_graph::Graph;
//!
//! let mut graph = Graph::create_empty();
//! graph.add_node("A").unwrap();
//! graph.add_node("B").unwrap();
//!
//! assert!(graph.add_edge("A", "B").unwrap());
//! assert!(graph.is_edge("A", "B").unwrap());
//! assert!(!graph.is_edge("B", "A").unwrap());
//! ```

mod edge;
mod error;
mod graph;
mod node;
pub mod store;

pub use edge::GraphEdge;
pub use error::{GraphError, Result};
pub use graph::{Graph, GraphSnapshot, GraphStats};
pub use node::{Node, NodeId};
