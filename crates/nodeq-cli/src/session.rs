//! The shell's session state.
//!
//! A session holds at most one active graph and remembers whether it
//! changed since it was last loaded, created or saved. The graph itself
//! knows nothing about saving.

use nodeq_graph::{Graph, GraphError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Graph is not loaded. Type 'load' or 'create' first.")]
    NotLoaded,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Default)]
pub struct Session {
    graph: Option<Graph>,
    unsaved: bool,
    /// File the active graph was last loaded from or saved to.
    source: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Replaces the active graph with an empty one.
    pub fn create(&mut self) {
        self.graph = Some(Graph::create_empty());
        self.unsaved = false;
        self.source = None;
        info!("Created empty graph");
    }

    /// Replaces the active graph with one read from `path`.
    ///
    /// On failure the previous graph stays active.
    pub fn load(&mut self, path: &Path) -> Result<&Graph> {
        let graph = Graph::read_from_file(path)?;
        info!(
            "Loaded {} nodes and {} edges from {}",
            graph.node_count(),
            graph.edge_count(),
            path.display()
        );

        self.unsaved = false;
        self.source = Some(path.to_path_buf());
        Ok(&*self.graph.insert(graph))
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        let graph = self.graph()?;
        graph.save_to_file(path)?;
        info!("Saved {} nodes to {}", graph.node_count(), path.display());

        self.unsaved = false;
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    pub fn graph(&self) -> Result<&Graph> {
        self.graph.as_ref().ok_or(SessionError::NotLoaded)
    }

    pub fn add_node(&mut self, name: &str) -> Result<()> {
        self.graph_mut()?.add_node(name)?;
        self.unsaved = true;
        Ok(())
    }

    pub fn remove_node(&mut self, name: &str) -> Result<()> {
        self.graph_mut()?.remove_node(name)?;
        self.unsaved = true;
        Ok(())
    }

    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        let added = self.graph_mut()?.add_edge(from, to)?;
        self.unsaved |= added;
        Ok(added)
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        let removed = self.graph_mut()?.remove_edge(from, to)?;
        self.unsaved |= removed;
        Ok(removed)
    }

    fn graph_mut(&mut self) -> Result<&mut Graph> {
        self.graph.as_mut().ok_or(SessionError::NotLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_requires_graph() {
        let mut session = Session::new();

        assert!(matches!(session.graph(), Err(SessionError::NotLoaded)));
        assert!(matches!(session.add_node("A"), Err(SessionError::NotLoaded)));
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_only_real_changes_mark_unsaved() {
        let mut session = Session::new();
        session.create();
        session.add_node("A").unwrap();
        session.add_node("B").unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("g.txt");
        session.save(&path).unwrap();
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.source(), Some(path.as_path()));

        assert!(session.add_node("A").is_err());
        assert!(!session.remove_edge("A", "B").unwrap());
        assert!(!session.has_unsaved_changes());

        assert!(session.add_edge("A", "B").unwrap());
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn test_failed_load_keeps_previous_graph() {
        let dir = tempdir().unwrap();
        let mut session = Session::new();
        session.create();
        session.add_node("kept").unwrap();

        let result = session.load(&dir.path().join("missing.txt"));
        assert!(matches!(
            result,
            Err(SessionError::Graph(GraphError::IoFailure { .. }))
        ));
        assert!(session.graph().unwrap().contains("kept"));
        assert!(session.has_unsaved_changes());
    }
}
