//! Edge-list graphs built from two dataset columns.
//!
//! Every row contributes one undirected edge between its value in the source
//! column and its value in the target column. The graph is a set, not a
//! multiset: repeated pairs (in either order) collapse into one edge, and a row
//! whose two values are equal becomes a self-loop.
//!
//! # Architecture
//!
//! ```text
//! Dataset columns -> NodeId (Text | Integer | Invalid) -> petgraph UnGraph
//! ```
//!
//! Missing cells are not dropped: they become the empty-text node `""`.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::dataset::{format_float, Cell, Dataset};
use crate::error::{Result, ShardError, ValidationError};

/// Identifier of a graph node.
///
/// Only text and integer identifiers are accepted by [`validate_nodes`]; any
/// other scalar is carried as `Invalid` with its display form so the
/// validation error can name it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Text(String),
    Integer(i64),
    Invalid(String),
}

impl NodeId {
    /// Convert a dataset cell into a node identifier. Missing cells become `""`.
    pub fn from_cell(cell: &Cell) -> Self {
        match cell {
            Cell::Missing => NodeId::Text(String::new()),
            Cell::Integer(v) => NodeId::Integer(*v),
            Cell::Text(s) => NodeId::Text(s.clone()),
            Cell::Float(v) => NodeId::Invalid(format_float(*v)),
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, NodeId::Invalid(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Text(s) | NodeId::Invalid(s) => write!(f, "{}", s),
            NodeId::Integer(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::Text(value.to_string())
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId::Integer(value)
    }
}

/// Undirected graph with unique node identifiers and a unique edge set.
///
/// Nodes keep the order in which they were first seen.
#[derive(Debug, Clone, Default)]
pub struct EdgeGraph {
    graph: UnGraph<NodeId, ()>,
    node_map: HashMap<NodeId, NodeIndex>,
}

impl EdgeGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if it is not present yet and return its index.
    pub fn add_node(&mut self, id: NodeId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_map.insert(id, idx);
        idx
    }

    /// Add an undirected edge, creating missing endpoints. Existing pairs are left as-is.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.graph.update_edge(a, b, ());
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.graph.node_weights()
    }

    /// Edges as endpoint pairs, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()]))
    }

    /// Neighbours of every node as dense positions, in the order of
    /// [`EdgeGraph::nodes`]. Self-loops are left out.
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        self.graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .neighbors(idx)
                    .filter(|&other| other != idx)
                    .map(|other| other.index())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
impl EdgeGraph {
    fn contains_node(&self, id: &NodeId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Check for an edge between two nodes, in either direction.
    fn contains_edge(&self, a: &NodeId, b: &NodeId) -> bool {
        match (self.node_map.get(a), self.node_map.get(b)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }
}

/// Build an undirected graph from two columns of a dataset.
///
/// Missing cells in either column become the empty-text node. No rows are
/// dropped, and a column that is entirely missing is not an error.
pub fn build_graph(dataset: &Dataset, source: &str, target: &str) -> Result<EdgeGraph> {
    let source_col = dataset
        .column(source)
        .ok_or_else(|| ShardError::ColumnNotFound {
            name: source.to_string(),
        })?;
    let target_col = dataset
        .column(target)
        .ok_or_else(|| ShardError::ColumnNotFound {
            name: target.to_string(),
        })?;

    let mut graph = EdgeGraph::new();
    for (s, t) in source_col.cells.iter().zip(&target_col.cells) {
        graph.add_edge(NodeId::from_cell(s), NodeId::from_cell(t));
    }

    debug!(
        "Built graph from {} -> {}: {} nodes, {} edges",
        source,
        target,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Check that every node identifier is text or an integer.
///
/// Fails on the first offending node, in node order.
pub fn validate_nodes(graph: &EdgeGraph) -> std::result::Result<(), ValidationError> {
    match graph.nodes().find(|node| !node.is_valid()) {
        Some(node) => Err(ValidationError {
            node: node.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dataset(data: &str) -> Dataset {
        Dataset::from_reader(data.as_bytes()).unwrap()
    }

    fn node_set(graph: &EdgeGraph) -> HashSet<NodeId> {
        graph.nodes().cloned().collect()
    }

    /// Incident edges; a self-loop counts twice.
    fn degree(graph: &EdgeGraph, id: &NodeId) -> usize {
        graph
            .edges()
            .map(|(a, b)| usize::from(a == id) + usize::from(b == id))
            .sum()
    }

    #[test]
    fn test_simple_edge_list() {
        let ds = dataset("from,to\nA,B\nB,C\nA,C\n");
        let graph = build_graph(&ds, "from", "to").unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        for (a, b) in [("A", "B"), ("B", "C"), ("A", "C")] {
            assert!(graph.contains_edge(&a.into(), &b.into()));
            assert!(graph.contains_edge(&b.into(), &a.into()));
        }
        let order: Vec<String> = graph.nodes().map(|n| n.to_string()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_missing_cell_becomes_empty_text_node() {
        let ds = dataset("from,to\n,X\n");
        let graph = build_graph(&ds, "from", "to").unwrap();

        assert!(graph.contains_node(&"".into()));
        assert!(graph.contains_edge(&"".into(), &"X".into()));
    }

    #[test]
    fn test_both_missing_is_self_loop() {
        let ds = dataset("from,to,w\n,,1\nA,B,2\n");
        let graph = build_graph(&ds, "from", "to").unwrap();

        assert!(graph.contains_edge(&"".into(), &"".into()));
        assert_eq!(degree(&graph, &"".into()), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let ds = dataset("a,b\nx,y\ny,x\nx,y\nx,x\nx,x\n");
        let graph = build_graph(&ds, "a", "b").unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(degree(&graph, &"x".into()), 3);
    }

    #[test]
    fn test_node_set_is_union_of_column_values() {
        let ds = dataset("s,t,other\n1,2,q\n2,3,r\n,5,s\n7,,t\n");
        let graph = build_graph(&ds, "s", "t").unwrap();

        // Both columns have a gap, so their values are floats
        let expected: HashSet<NodeId> = [
            NodeId::Invalid("1.0".to_string()),
            NodeId::Invalid("2.0".to_string()),
            NodeId::Invalid("3.0".to_string()),
            NodeId::Invalid("5.0".to_string()),
            NodeId::Invalid("7.0".to_string()),
            NodeId::Text(String::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(node_set(&graph), expected);
    }

    #[test]
    fn test_build_is_idempotent() {
        let ds = dataset("from,to\nA,B\nB,C\nC,A\n,D\n");
        let first = build_graph(&ds, "from", "to").unwrap();
        let second = build_graph(&ds, "from", "to").unwrap();

        assert_eq!(node_set(&first), node_set(&second));
        let edges = |g: &EdgeGraph| -> Vec<(NodeId, NodeId)> {
            g.edges().map(|(a, b)| (a.clone(), b.clone())).collect()
        };
        assert_eq!(edges(&first), edges(&second));
    }

    #[test]
    fn test_same_column_for_both_ends() {
        let ds = dataset("a\nx\ny\n");
        let graph = build_graph(&ds, "a", "a").unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains_edge(&"x".into(), &"x".into()));
    }

    #[test]
    fn test_unknown_column() {
        let ds = dataset("from,to\nA,B\n");
        let err = build_graph(&ds, "from", "dest").unwrap_err();
        assert!(matches!(err, ShardError::ColumnNotFound { ref name } if name == "dest"));
    }

    #[test]
    fn test_all_missing_column_is_not_an_error() {
        let ds = dataset("from,to\n,A\n,B\n");
        let graph = build_graph(&ds, "from", "to").unwrap();
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_validate_accepts_text_and_integers() {
        let ds = dataset("name,id\nalice,1\nbob,2\n");
        let graph = build_graph(&ds, "name", "id").unwrap();
        assert!(validate_nodes(&graph).is_ok());

        let ds = dataset("a,b\n1,2\n");
        assert!(validate_nodes(&build_graph(&ds, "a", "b").unwrap()).is_ok());

        assert!(validate_nodes(&EdgeGraph::new()).is_ok());
    }

    #[test]
    fn test_validate_rejects_float_node() {
        let ds = dataset("from,to\n1.5,X\n2.0,Y\n");
        let graph = build_graph(&ds, "from", "to").unwrap();

        let err = validate_nodes(&graph).unwrap_err();
        assert_eq!(err.node, "1.5");
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_validate_rejects_integer_column_with_gap() {
        let ds = dataset("from,to\n1,X\n,Y\n");
        let graph = build_graph(&ds, "from", "to").unwrap();
        assert!(graph.contains_node(&"".into()));

        let err = validate_nodes(&graph).unwrap_err();
        assert_eq!(err.node, "1.0");
        assert_eq!(err.to_string(), "Node 1.0 has an invalid identifier type.");
    }

    #[test]
    fn test_validate_reports_first_invalid_node() {
        let mut graph = EdgeGraph::new();
        graph.add_edge("a".into(), NodeId::Invalid("3.25".to_string()));
        graph.add_edge(NodeId::Invalid("9.5".to_string()), 4.into());

        let err = validate_nodes(&graph).unwrap_err();
        assert_eq!(err.node, "3.25");
    }

    #[test]
    fn test_text_and_integer_ids_are_distinct() {
        let mut graph = EdgeGraph::new();
        graph.add_edge(NodeId::Integer(1), NodeId::Text("1".to_string()));
        assert_eq!(graph.node_count(), 2);
        let text = NodeId::Text("1".to_string());
        assert_eq!(graph.nodes().position(|n| *n == text), Some(1));
    }

    #[test]
    fn test_neighbors_skip_self_loops() {
        let mut graph = EdgeGraph::new();
        graph.add_edge("a".into(), "b".into());
        graph.add_edge("b".into(), "c".into());
        graph.add_edge("b".into(), "b".into());
        graph.add_node("d".into());

        let mut neighbors = graph.neighbors();
        for list in &mut neighbors {
            list.sort_unstable();
        }
        assert_eq!(neighbors, vec![vec![1], vec![0, 2], vec![1], vec![]]);
    }
}
