//! In-memory graph storage
//!
//! Nodes and edges are kept under the identifiers the caller supplies, with
//! adjacency lists for one-hop expansion and a label index for scans. The
//! store also keeps the persisted namespace prefix definitions, which play the
//! role of the metadata store when the graph came from an RDF import.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyValue;
use super::types::{EdgeId, Label, NodeId};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during graph operations
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Fixture I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fixture format error: {0}")]
    Fixture(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Serialized form of a graph, as read from a JSON fixture file
#[derive(Debug, Default, Deserialize)]
pub struct GraphFixture {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Edge>,
    /// IRI stem → prefix, as written by the RDF importer
    #[serde(default)]
    pub namespaces: IndexMap<String, String>,
}

/// In-memory graph storage
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Node storage, ordered by id so scans are reproducible
    nodes: BTreeMap<NodeId, Arc<Node>>,

    /// Edge storage
    edges: BTreeMap<EdgeId, Edge>,

    /// Outgoing edges for each node (adjacency list)
    outgoing: FxHashMap<NodeId, Vec<EdgeId>>,

    /// Incoming edges for each node (adjacency list)
    incoming: FxHashMap<NodeId, Vec<EdgeId>>,

    /// Label index for scans
    label_index: FxHashMap<Label, BTreeSet<NodeId>>,

    /// Persisted namespace definitions (IRI stem → prefix)
    namespaces: IndexMap<String, String>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a parsed fixture
    pub fn from_fixture(fixture: GraphFixture) -> GraphResult<Self> {
        let mut store = Self::new();
        for node in fixture.nodes {
            store.add_node(node)?;
        }
        for edge in fixture.relationships {
            store.add_edge(edge)?;
        }
        for (namespace, prefix) in fixture.namespaces {
            store.add_namespace(namespace, prefix);
        }
        Ok(store)
    }

    /// Load a JSON fixture file
    pub fn load_fixture(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let fixture: GraphFixture = serde_json::from_str(&data)?;
        let store = Self::from_fixture(fixture)?;
        info!(
            "Loaded graph fixture {:?}: {} nodes, {} relationships",
            path,
            store.node_count(),
            store.edge_count()
        );
        Ok(store)
    }

    /// Insert a node under its own id
    pub fn add_node(&mut self, node: Node) -> GraphResult<NodeId> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(GraphError::NodeAlreadyExists(id));
        }
        for label in &node.labels {
            self.label_index.entry(label.clone()).or_default().insert(id);
        }
        self.nodes.insert(id, Arc::new(node));
        Ok(id)
    }

    /// Insert an edge; both endpoints must already exist
    pub fn add_edge(&mut self, edge: Edge) -> GraphResult<EdgeId> {
        let id = edge.id;
        if self.edges.contains_key(&id) {
            return Err(GraphError::EdgeAlreadyExists(id));
        }
        if !self.nodes.contains_key(&edge.source) {
            return Err(GraphError::InvalidEdgeSource(edge.source));
        }
        if !self.nodes.contains_key(&edge.target) {
            return Err(GraphError::InvalidEdgeTarget(edge.target));
        }
        self.outgoing.entry(edge.source).or_default().push(id);
        self.incoming.entry(edge.target).or_default().push(id);
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Register a namespace definition
    pub fn add_namespace(&mut self, namespace: impl Into<String>, prefix: impl Into<String>) {
        self.namespaces.insert(namespace.into(), prefix.into());
    }

    /// Persisted namespace definitions (IRI stem → prefix)
    pub fn namespaces(&self) -> &IndexMap<String, String> {
        &self.namespaces
    }

    /// Get a node by id
    pub fn get_node(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.nodes.get(&id)
    }

    /// Get an edge by id
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// First node after `after` in id order, optionally restricted to `label`.
    ///
    /// Lets a cursor walk the store one node at a time without collecting ids.
    pub fn node_after(&self, after: Option<NodeId>, label: Option<&str>) -> Option<&Arc<Node>> {
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        match label {
            None => self.nodes.range((lower, Bound::Unbounded)).next().map(|(_, node)| node),
            Some(label) => {
                let ids = self.label_index.get(&Label::new(label))?;
                let id = ids.range((lower, Bound::Unbounded)).next()?;
                self.nodes.get(id)
            }
        }
    }

    /// First edge after `after` in id order
    pub fn edge_after(&self, after: Option<EdgeId>) -> Option<&Edge> {
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        self.edges.range((lower, Bound::Unbounded)).next().map(|(_, edge)| edge)
    }

    /// Edges touching `node`, outgoing first, then incoming.
    ///
    /// A self-loop is reported once.
    pub fn edges_of(&self, node: NodeId) -> Vec<EdgeId> {
        let mut result: Vec<EdgeId> = self.outgoing.get(&node).cloned().unwrap_or_default();
        if let Some(incoming) = self.incoming.get(&node) {
            for id in incoming {
                if !result.contains(id) {
                    result.push(*id);
                }
            }
        }
        result
    }

    /// First node with `label` whose property `key` equals `value`
    pub fn find_node(&self, label: &str, key: &str, value: &PropertyValue) -> Option<&Arc<Node>> {
        let ids = self.label_index.get(&Label::new(label))?;
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .find(|node| node.get_property(key) == Some(value))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(Node::new(1).with_label("Person").with_property("name", "Ann")).unwrap();
        store.add_node(Node::new(2).with_label("Person").with_property("name", "Bo")).unwrap();
        store.add_node(Node::new(3).with_label("City")).unwrap();
        store.add_edge(Edge::new(9, 1, 2, "KNOWS")).unwrap();
        store.add_edge(Edge::new(10, 3, 1, "HOME_OF")).unwrap();
        store
    }

    #[test]
    fn test_add_and_lookup() {
        let store = sample();
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.get_node(NodeId(2)).unwrap().get_property("name").unwrap().as_string(), Some("Bo"));
        assert!(store.get_node(NodeId(42)).is_none());
    }

    #[test]
    fn test_node_after_walks_in_order() {
        let store = sample();
        let mut seen = Vec::new();
        let mut last = None;
        while let Some(node) = store.node_after(last, Some("Person")) {
            seen.push(node.id);
            last = Some(node.id);
        }
        assert_eq!(seen, vec![NodeId(1), NodeId(2)]);
        assert_eq!(store.node_after(Some(NodeId(2)), None).unwrap().id, NodeId(3));
        assert!(store.node_after(None, Some("Missing")).is_none());
    }

    #[test]
    fn test_edge_after() {
        let store = sample();
        assert_eq!(store.edge_after(None).unwrap().id, EdgeId(9));
        assert_eq!(store.edge_after(Some(EdgeId(9))).unwrap().id, EdgeId(10));
        assert!(store.edge_after(Some(EdgeId(10))).is_none());
    }

    #[test]
    fn test_duplicate_and_dangling() {
        let mut store = sample();
        assert!(matches!(
            store.add_node(Node::new(1)),
            Err(GraphError::NodeAlreadyExists(NodeId(1)))
        ));
        assert!(matches!(
            store.add_edge(Edge::new(11, 1, 99, "X")),
            Err(GraphError::InvalidEdgeTarget(NodeId(99)))
        ));
        assert!(matches!(
            store.add_edge(Edge::new(12, 99, 1, "X")),
            Err(GraphError::InvalidEdgeSource(NodeId(99)))
        ));
    }

    #[test]
    fn test_edges_of_both_directions() {
        let store = sample();
        assert_eq!(store.edges_of(NodeId(1)), vec![EdgeId(9), EdgeId(10)]);
        assert_eq!(store.edges_of(NodeId(2)), vec![EdgeId(9)]);
    }

    #[test]
    fn test_self_loop_reported_once() {
        let mut store = sample();
        store.add_edge(Edge::new(20, 3, 3, "NEAR")).unwrap();
        assert_eq!(store.edges_of(NodeId(3)), vec![EdgeId(10), EdgeId(20)]);
    }

    #[test]
    fn test_find_node() {
        let store = sample();
        let found = store.find_node("Person", "name", &"Bo".into()).unwrap();
        assert_eq!(found.id, NodeId(2));
        assert!(store.find_node("City", "name", &"Bo".into()).is_none());
    }

    #[test]
    fn test_from_fixture() {
        let fixture: GraphFixture = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": 1, "labels": ["Resource"], "properties": {"uri": "http://ex.org/a"}},
                    {"id": 2, "labels": ["Resource"], "properties": {"uri": "http://ex.org/b"}}
                ],
                "relationships": [{"id": 5, "type": "ns0_knows", "start": 1, "end": 2}],
                "namespaces": {"http://xmlns.com/foaf/0.1/": "ns0"}
            }"#,
        )
        .unwrap();
        let store = GraphStore::from_fixture(fixture).unwrap();
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.get_edge(EdgeId(5)).unwrap().edge_type.as_str(), "ns0_knows");
        assert_eq!(store.namespaces().get("http://xmlns.com/foaf/0.1/").map(String::as_str), Some("ns0"));
    }

    #[test]
    fn test_load_demo_fixture() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/graph.json");
        let store = GraphStore::load_fixture(path).unwrap();
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.edges_of(NodeId(1)).len(), 2);
    }

    #[test]
    fn test_load_missing_fixture() {
        let err = GraphStore::load_fixture("/nonexistent/graph.json").unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
