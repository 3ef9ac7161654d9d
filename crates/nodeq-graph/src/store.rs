//! Plain text persistence.
//!
//! A graph file looks like this:
//!
//! ```text
//! 3          node count
//! A          name of the node with id 0
//! 0
//! B
//! 1
//! C
//! 2
//! 2 1 2      out-degree of id 0, then its child ids
//! 0
//! 1 0
//! ```
//!
//! Adjacency lines appear in identity order `0..N`. Identities in a file are
//! always dense; the writer renumbers live nodes before saving, so ids in
//! memory and ids on disk need not match.

use crate::error::{GraphError, Result};
use crate::graph::{validate_name, Graph};
use crate::node::NodeId;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

impl Graph {
    /// Loads a graph from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
        read_graph(BufReader::new(file), path)
    }

    /// Writes the graph to a file, replacing any previous contents.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
        write_graph(self, BufWriter::new(file), path)
    }
}

/// Parses a graph from `reader`.
///
/// `origin` only labels I/O errors.
pub fn read_graph<R: BufRead>(reader: R, origin: &Path) -> Result<Graph> {
    let mut lines = LineReader::new(reader, origin);

    let count = lines.expect("node count")?;
    let count = parse_number(count.trim(), lines.line_no(), "node count")?;

    let mut graph = Graph::new();
    for _ in 0..count {
        let name = lines.expect("node name")?;
        if validate_name(&name).is_err() {
            return Err(GraphError::corrupt(
                lines.line_no(),
                format!("invalid node name {name:?}"),
            ));
        }
        if graph.contains(&name) {
            return Err(GraphError::corrupt(
                lines.line_no(),
                format!("node '{name}' is declared twice"),
            ));
        }

        let id = lines.expect("node id")?;
        let id = parse_number(id.trim(), lines.line_no(), "node id")?;
        if id >= count {
            return Err(GraphError::corrupt(
                lines.line_no(),
                format!("node id {id} is outside 0..{count}"),
            ));
        }
        if let Some(other) = graph.name_of(id) {
            return Err(GraphError::corrupt(
                lines.line_no(),
                format!("node id {id} is already used by '{other}'"),
            ));
        }

        graph.register(&name, id);
    }

    // `count` distinct ids below `count` cover 0..count exactly.
    for id in 0..count {
        let line = lines.expect("adjacency list")?;
        let line_no = lines.line_no();
        let mut tokens = line.split_whitespace();

        let degree = tokens
            .next()
            .ok_or_else(|| GraphError::corrupt(line_no, "missing out-degree"))?;
        let degree = parse_number(degree, line_no, "out-degree")?;

        let children = tokens
            .map(|token| parse_number(token, line_no, "child id"))
            .collect::<Result<Vec<NodeId>>>()?;
        if children.len() != degree {
            return Err(GraphError::corrupt(
                line_no,
                format!(
                    "out-degree is {degree} but {} child ids follow",
                    children.len()
                ),
            ));
        }

        for child in children {
            if graph.name_of(child).is_none() {
                return Err(GraphError::corrupt(
                    line_no,
                    format!("child id {child} was never declared"),
                ));
            }
            graph.link(id, child);
        }
    }

    while let Some(rest) = lines.next_line()? {
        if !rest.trim().is_empty() {
            return Err(GraphError::corrupt(
                lines.line_no(),
                "unexpected content after the last adjacency list",
            ));
        }
    }

    Ok(graph)
}

/// Serializes `graph` into `writer` and flushes it.
///
/// `origin` only labels I/O errors.
pub fn write_graph<W: Write>(graph: &Graph, mut writer: W, origin: &Path) -> Result<()> {
    encode(graph, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| GraphError::io(origin, e))
}

fn encode<W: Write>(graph: &Graph, writer: &mut W) -> io::Result<()> {
    let dense: HashMap<NodeId, usize> = graph
        .nodes()
        .enumerate()
        .map(|(index, (_, node))| (node.id(), index))
        .collect();

    writeln!(writer, "{}", dense.len())?;
    for (index, (name, _)) in graph.nodes().enumerate() {
        writeln!(writer, "{name}")?;
        writeln!(writer, "{index}")?;
    }

    for (_, node) in graph.nodes() {
        let children: Vec<usize> = node
            .children()
            .filter_map(|child| dense.get(&child).copied())
            .collect();

        write!(writer, "{}", children.len())?;
        for child in children {
            write!(writer, " {child}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn parse_number(token: &str, line: usize, what: &str) -> Result<usize> {
    token
        .parse()
        .map_err(|_| GraphError::corrupt(line, format!("expected {what}, found '{token}'")))
}

/// Reads lines while tracking the current 1-based line number.
struct LineReader<'a, R> {
    reader: R,
    origin: &'a Path,
    line_no: usize,
}

impl<'a, R: BufRead> LineReader<'a, R> {
    fn new(reader: R, origin: &'a Path) -> Self {
        Self {
            reader,
            origin,
            line_no: 0,
        }
    }

    /// Line number of the most recently returned line.
    fn line_no(&self) -> usize {
        self.line_no
    }

    /// Returns the next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let read = self.reader.read_line(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                GraphError::corrupt(self.line_no + 1, "line is not valid UTF-8")
            } else {
                GraphError::io(self.origin, e)
            }
        })?;
        if read == 0 {
            return Ok(None);
        }

        self.line_no += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    /// Like `next_line`, but running out of input is a format error.
    fn expect(&mut self, what: &str) -> Result<String> {
        self.next_line()?.ok_or_else(|| {
            GraphError::corrupt(self.line_no + 1, format!("unexpected end of file, expected {what}"))
        })
    }
}
