//! In-memory query engine over a [`GraphStore`] snapshot
//!
//! Understands describe requests natively and a small read-only Cypher subset:
//!
//! ```text
//! MATCH (n[:Label]) RETURN n [LIMIT k]
//! MATCH (a[:Label])-[r[:TYPE]]->(b[:Label]) RETURN a, r, b [LIMIT k]
//! ```
//!
//! Any other query text can be served by registering a canned result for it
//! with [`MemoryEngine::with_result`]. All cursors walk the store lazily, one
//! row per call.

use super::engine::{
    cypher_id, GraphQuery, NodeSelector, QueryEngine, QueryError, QueryResult, ReadTransaction, RowStream,
    DESCRIBE_NODE_COLUMN, DESCRIBE_REL_COLUMN, DESCRIBE_VALUE_COLUMN,
};
use super::row::{Relationship, Row, Value};
use crate::graph::{EdgeId, GraphStore, Node, NodeId, PropertyValue};
use crate::rdf::{NamespaceStore, MetadataError};
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

const RESOURCE_LABEL: &str = "Resource";
const URI_PROPERTY: &str = "uri";

fn node_scan_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^MATCH\s*\(\s*(?P<var>\w+)\s*(?::\s*(?P<label>\w+))?\s*\)\s*RETURN\s+(?P<ret>\w+)\s*(?:LIMIT\s+(?P<limit>\d+))?$",
        )
        .expect("node scan pattern is valid")
    })
}

fn path_scan_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^MATCH\s*\(\s*(?P<a>\w+)\s*(?::\s*(?P<alabel>\w+))?\s*\)\s*-\s*\[\s*(?P<r>\w+)\s*(?::\s*(?P<rtype>\w+))?\s*\]\s*->\s*\(\s*(?P<b>\w+)\s*(?::\s*(?P<blabel>\w+))?\s*\)\s*RETURN\s+(?P<ret>\w+(?:\s*,\s*\w+)*)\s*(?:LIMIT\s+(?P<limit>\d+))?$",
        )
        .expect("path scan pattern is valid")
    })
}

/// In-memory engine
pub struct MemoryEngine {
    graph: Arc<GraphStore>,
    canned: Arc<FxHashMap<String, Arc<[Row]>>>,
    next_tx: AtomicU64,
}

impl MemoryEngine {
    /// Create an engine over `graph`
    pub fn new(graph: GraphStore) -> Self {
        Self {
            graph: Arc::new(graph),
            canned: Arc::new(FxHashMap::default()),
            next_tx: AtomicU64::new(1),
        }
    }

    /// Serve `rows` whenever exactly `query` (ignoring surrounding whitespace
    /// and a trailing `;`) is executed
    pub fn with_result(mut self, query: &str, rows: Vec<Row>) -> Self {
        Arc::make_mut(&mut self.canned).insert(normalize(query).to_string(), rows.into());
        self
    }

    /// The underlying graph
    pub fn graph(&self) -> &Arc<GraphStore> {
        &self.graph
    }
}

impl QueryEngine for MemoryEngine {
    fn begin_read(&self) -> QueryResult<Box<dyn ReadTransaction>> {
        let id = self.next_tx.fetch_add(1, Ordering::Relaxed);
        debug!(tx = id, "read transaction opened");
        Ok(Box::new(MemoryTransaction {
            id,
            graph: Arc::clone(&self.graph),
            canned: Arc::clone(&self.canned),
        }))
    }
}

/// Namespace definitions persisted alongside the graph
impl NamespaceStore for MemoryEngine {
    fn namespace_pairs(&self) -> Result<Vec<(String, String)>, MetadataError> {
        Ok(self
            .graph
            .namespaces()
            .iter()
            .map(|(namespace, prefix)| (namespace.clone(), prefix.clone()))
            .collect())
    }
}

struct MemoryTransaction {
    id: u64,
    graph: Arc<GraphStore>,
    canned: Arc<FxHashMap<String, Arc<[Row]>>>,
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        debug!(tx = self.id, "read transaction closed");
    }
}

impl ReadTransaction for MemoryTransaction {
    fn execute(&self, query: &GraphQuery) -> QueryResult<RowStream> {
        match query {
            GraphQuery::Cypher { text, .. } => self.execute_cypher(text),
            GraphQuery::Describe { selector, with_context } => {
                Ok(Box::new(self.describe(selector, *with_context)))
            }
        }
    }
}

impl MemoryTransaction {
    fn execute_cypher(&self, text: &str) -> QueryResult<RowStream> {
        let text = normalize(text);
        if let Some(rows) = self.canned.get(text) {
            return Ok(Box::new(CannedRows {
                rows: Arc::clone(rows),
                position: 0,
            }));
        }
        if let Some(caps) = node_scan_pattern().captures(text) {
            return self.node_scan(&caps).map(|scan| Box::new(scan) as RowStream);
        }
        if let Some(caps) = path_scan_pattern().captures(text) {
            return self.path_scan(&caps).map(|scan| Box::new(scan) as RowStream);
        }
        Err(QueryError::Unsupported(text.to_string()))
    }

    fn node_scan(&self, caps: &Captures<'_>) -> QueryResult<NodeScan> {
        let var = &caps["var"];
        let ret = &caps["ret"];
        if ret != var {
            return Err(QueryError::Syntax(format!("Variable `{}` not defined", ret)));
        }
        Ok(NodeScan {
            graph: Arc::clone(&self.graph),
            label: caps.name("label").map(|m| m.as_str().to_string()),
            column: var.to_string(),
            last: None,
            remaining: parse_limit(caps)?,
        })
    }

    fn path_scan(&self, caps: &Captures<'_>) -> QueryResult<PathScan> {
        let mut returns = Vec::new();
        for name in caps["ret"].split(',').map(str::trim) {
            let part = if name == &caps["a"] {
                PathPart::Start
            } else if name == &caps["r"] {
                PathPart::Rel
            } else if name == &caps["b"] {
                PathPart::End
            } else {
                return Err(QueryError::Syntax(format!("Variable `{}` not defined", name)));
            };
            returns.push((name.to_string(), part));
        }
        Ok(PathScan {
            graph: Arc::clone(&self.graph),
            start_label: caps.name("alabel").map(|m| m.as_str().to_string()),
            rel_type: caps.name("rtype").map(|m| m.as_str().to_string()),
            end_label: caps.name("blabel").map(|m| m.as_str().to_string()),
            returns,
            last: None,
            remaining: parse_limit(caps)?,
        })
    }

    fn describe(&self, selector: &NodeSelector, with_context: bool) -> DescribeRows {
        let by_uri = matches!(selector, NodeSelector::ByUri(_));
        let node = match selector {
            NodeSelector::ById(id) => self.graph.get_node(*id).cloned(),
            NodeSelector::ByUri(uri) => self
                .graph
                .find_node(RESOURCE_LABEL, URI_PROPERTY, &PropertyValue::String(uri.clone()))
                .cloned(),
        };
        let edges = match (&node, with_context) {
            (Some(node), true) => self.graph.edges_of(node.id),
            _ => Vec::new(),
        };
        DescribeRows {
            graph: Arc::clone(&self.graph),
            node,
            edges: edges.into_iter(),
            by_uri,
            emitted: false,
        }
    }
}

fn normalize(query: &str) -> &str {
    query.trim().trim_end_matches(';').trim_end()
}

fn parse_limit(caps: &Captures<'_>) -> QueryResult<Option<usize>> {
    caps.name("limit")
        .map(|m| {
            m.as_str()
                .parse::<usize>()
                .map_err(|e| QueryError::Syntax(format!("Invalid LIMIT: {}", e)))
        })
        .transpose()
}

/// Resolve an edge id into a row relationship
fn relationship(graph: &GraphStore, id: EdgeId) -> Option<Relationship> {
    let edge = graph.get_edge(id)?;
    let start = graph.get_node(edge.source)?;
    let end = graph.get_node(edge.target)?;
    Some(Relationship::new(
        edge.id,
        edge.edge_type.clone(),
        Arc::clone(start),
        Arc::clone(end),
    ))
}

struct CannedRows {
    rows: Arc<[Row]>,
    position: usize,
}

impl Iterator for CannedRows {
    type Item = QueryResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.position)?.clone();
        self.position += 1;
        Some(Ok(row))
    }
}

struct NodeScan {
    graph: Arc<GraphStore>,
    label: Option<String>,
    column: String,
    last: Option<NodeId>,
    remaining: Option<usize>,
}

impl Iterator for NodeScan {
    type Item = QueryResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        let node = Arc::clone(self.graph.node_after(self.last, self.label.as_deref())?);
        self.last = Some(node.id);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(Ok(Row::new().with(self.column.clone(), node)))
    }
}

#[derive(Debug, Clone, Copy)]
enum PathPart {
    Start,
    Rel,
    End,
}

struct PathScan {
    graph: Arc<GraphStore>,
    start_label: Option<String>,
    rel_type: Option<String>,
    end_label: Option<String>,
    returns: Vec<(String, PathPart)>,
    last: Option<EdgeId>,
    remaining: Option<usize>,
}

impl PathScan {
    fn matches(&self, rel: &Relationship) -> bool {
        let label_ok = |node: &Node, label: &Option<String>| {
            label.as_deref().map_or(true, |l| node.has_label(l))
        };
        self.rel_type.as_deref().map_or(true, |t| rel.rel_type.as_str() == t)
            && label_ok(&rel.start, &self.start_label)
            && label_ok(&rel.end, &self.end_label)
    }
}

impl Iterator for PathScan {
    type Item = QueryResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            let edge_id = self.graph.edge_after(self.last)?.id;
            self.last = Some(edge_id);
            let rel = match relationship(&self.graph, edge_id) {
                Some(rel) => rel,
                None => {
                    return Some(Err(QueryError::Execution(format!(
                        "Relationship {} has a missing endpoint",
                        edge_id
                    ))))
                }
            };
            if !self.matches(&rel) {
                continue;
            }
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            let mut row = Row::new();
            for (name, part) in &self.returns {
                let value = match part {
                    PathPart::Start => Value::Node(Arc::clone(&rel.start)),
                    PathPart::Rel => Value::Relationship(rel.clone()),
                    PathPart::End => Value::Node(Arc::clone(&rel.end)),
                };
                row.bind(name.clone(), value);
            }
            return Some(Ok(row));
        }
    }
}

/// Rows `x, r, value` for one node; `r` and `value` are null when the node has
/// no (matching) relationships or context was not requested.
struct DescribeRows {
    graph: Arc<GraphStore>,
    node: Option<Arc<Node>>,
    edges: std::vec::IntoIter<EdgeId>,
    by_uri: bool,
    emitted: bool,
}

impl DescribeRows {
    fn row(&self, node: &Arc<Node>, rel: Option<Relationship>, value: Option<PropertyValue>) -> Row {
        Row::new()
            .with(DESCRIBE_NODE_COLUMN, Arc::clone(node))
            .with(DESCRIBE_REL_COLUMN, rel)
            .with(DESCRIBE_VALUE_COLUMN, value)
    }
}

impl Iterator for DescribeRows {
    type Item = QueryResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node.clone()?;
        for edge_id in self.edges.by_ref() {
            let rel = match relationship(&self.graph, edge_id) {
                Some(rel) => rel,
                None => continue,
            };
            let other = if rel.start.id == node.id { &rel.end } else { &rel.start };
            let value = if self.by_uri {
                if !other.has_label(RESOURCE_LABEL) {
                    continue;
                }
                match other.get_property(URI_PROPERTY) {
                    Some(uri) => uri.clone(),
                    None => continue,
                }
            } else {
                match cypher_id(other.id) {
                    Ok(id) => PropertyValue::Int64(id),
                    Err(e) => return Some(Err(e)),
                }
            };
            self.emitted = true;
            return Some(Ok(self.row(&node, Some(rel), Some(value))));
        }
        if self.emitted {
            return None;
        }
        self.emitted = true;
        Some(Ok(self.row(&node, None, None)))
    }
}
