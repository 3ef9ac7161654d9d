//! Error types for graph operations and persistence.

use std::path::PathBuf;
use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug)]
pub enum GraphError {
    /// A node with this name is already registered.
    #[error("Node '{0}' already exists")]
    DuplicateName(String),

    /// The name does not refer to a node in the graph.
    #[error("Node '{0}' is not in the graph")]
    UnknownName(String),

    /// The name can't be stored in the line-oriented file format.
    #[error("Invalid node name {0:?}: names must be non-empty and fit on one line")]
    InvalidName(String),

    /// The two adjacency directions disagree about an edge.
    #[error("Edge {from} -> {to} is recorded on only one side")]
    Inconsistent { from: NodeId, to: NodeId },

    /// The file does not follow the graph format.
    #[error("Invalid file at line {line}: {reason}")]
    CorruptFile { line: usize, reason: String },

    /// The file could not be read or written.
    #[error("Error accessing '{}': {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraphError {
    pub(crate) fn corrupt(line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptFile {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
