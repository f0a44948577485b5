//! Row stream → triples
//!
//! [`TripleProjector`] walks a query result forward-only, projecting every
//! node and relationship it finds through an [`IdentityStrategy`] and handing
//! each triple to a [`TripleSink`] as soon as it is built. A node's own type
//! and property triples are emitted the first time the node is seen in the
//! request; relationships are emitted every time they occur.

use super::identity::{EntityKey, IdentityStrategy};
use super::literal::TypedLiteralEncoder;
use super::namespace::NamespaceMapping;
use super::serialization::SerializeError;
use super::types::{BlankNode, NamedNode, RdfObject, Triple};
use super::uri::{encode_local_name, named_node, UnresolvedPrefixPolicy, UriBuilder, UriError};
use crate::graph::{Node, NodeId, PropertyValue};
use crate::query::{QueryError, QueryResult, Relationship, Row, Value};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Projection errors
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error(transparent)]
    Uri(#[from] UriError),

    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] SerializeError),
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Namespaces used to mint IRIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSettings {
    /// Namespace of labels, keys and types
    pub vocabulary: String,
    pub vocabulary_prefix: String,
    /// Namespace of synthetic node IRIs
    pub individual: String,
    pub individual_prefix: String,
    /// Namespace of ad-hoc exported statements
    pub export_base: String,
    pub unresolved_prefix: UnresolvedPrefixPolicy,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            vocabulary: "neo4j://vocabulary#".to_string(),
            vocabulary_prefix: "neovoc".to_string(),
            individual: "neo4j://indiv#".to_string(),
            individual_prefix: "neoind".to_string(),
            export_base: "http://neo4j.com/".to_string(),
            unresolved_prefix: UnresolvedPrefixPolicy::default(),
        }
    }
}

/// State owned by one streamed response
pub struct RequestContext {
    settings: Arc<ProjectionSettings>,
    namespaces: NamespaceMapping,
    /// Entities whose own statements were already emitted
    seen: FxHashSet<EntityKey>,
    /// Blank nodes minted for malformed URIs
    blank_nodes: FxHashMap<String, BlankNode>,
    /// Blank nodes of nodes without a URI
    id_blank_nodes: FxHashMap<NodeId, BlankNode>,
}

impl RequestContext {
    pub fn new(settings: Arc<ProjectionSettings>, namespaces: NamespaceMapping) -> Self {
        Self {
            settings,
            namespaces,
            seen: FxHashSet::default(),
            blank_nodes: FxHashMap::default(),
            id_blank_nodes: FxHashMap::default(),
        }
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    pub fn namespaces(&self) -> &NamespaceMapping {
        &self.namespaces
    }

    pub fn uri_builder(&self) -> UriBuilder<'_> {
        UriBuilder::new(
            &self.settings.vocabulary,
            &self.namespaces,
            self.settings.unresolved_prefix,
        )
    }

    /// Record `key`; false if it was already recorded
    pub fn mark_seen(&mut self, key: EntityKey) -> bool {
        self.seen.insert(key)
    }

    pub fn is_seen(&self, key: &EntityKey) -> bool {
        self.seen.contains(key)
    }

    /// Blank node standing for the unparseable URI `raw`.
    ///
    /// Always freshly minted, so it never shares a label with
    /// [`Self::blank_node_for_id`].
    pub fn blank_node_for(&mut self, raw: &str) -> BlankNode {
        self.blank_nodes
            .entry(raw.to_string())
            .or_insert_with(BlankNode::new)
            .clone()
    }

    /// Blank node standing for a node that has no URI at all
    pub fn blank_node_for_id(&mut self, id: NodeId) -> BlankNode {
        self.id_blank_nodes
            .entry(id)
            .or_insert_with(|| BlankNode::with_id(&format!("node{}", id)).unwrap_or_default())
            .clone()
    }
}

/// Receiver of projected triples
pub trait TripleSink {
    fn emit(&mut self, triple: &Triple) -> Result<(), SerializeError>;
}

impl TripleSink for Vec<Triple> {
    fn emit(&mut self, triple: &Triple) -> Result<(), SerializeError> {
        self.push(triple.clone());
        Ok(())
    }
}

/// Per-request totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    pub rows: u64,
    pub triples: u64,
    pub nodes: u64,
    pub relationships: u64,
}

/// Projects result rows into triples
pub struct TripleProjector<'a> {
    strategy: &'a dyn IdentityStrategy,
    ctx: RequestContext,
    stats: ProjectionStats,
}

impl<'a> TripleProjector<'a> {
    pub fn new(strategy: &'a dyn IdentityStrategy, ctx: RequestContext) -> Self {
        Self {
            strategy,
            ctx,
            stats: ProjectionStats::default(),
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn stats(&self) -> ProjectionStats {
        self.stats
    }

    /// Consume `rows`, emitting into `sink`. Stops at the first failing row.
    pub fn project<I, S>(&mut self, rows: I, sink: &mut S) -> ProjectionResult<ProjectionStats>
    where
        I: IntoIterator<Item = QueryResult<Row>>,
        S: TripleSink + ?Sized,
    {
        for row in rows {
            self.project_row(&row?, sink)?;
        }
        debug!(
            strategy = self.strategy.name(),
            rows = self.stats.rows,
            triples = self.stats.triples,
            nodes = self.stats.nodes,
            relationships = self.stats.relationships,
            "Projection finished"
        );
        Ok(self.stats)
    }

    /// Project every node and relationship bound in `row`; scalars and nulls
    /// are ignored
    pub fn project_row<S>(&mut self, row: &Row, sink: &mut S) -> ProjectionResult<()>
    where
        S: TripleSink + ?Sized,
    {
        self.stats.rows += 1;
        for value in row.values() {
            match value {
                Value::Node(node) => self.project_node(node, sink)?,
                Value::Relationship(rel) => self.project_relationship(rel, sink)?,
                Value::Scalar(_) | Value::Null => {}
            }
        }
        Ok(())
    }

    fn project_node<S>(&mut self, node: &Node, sink: &mut S) -> ProjectionResult<()>
    where
        S: TripleSink + ?Sized,
    {
        let strategy = self.strategy;
        if !self.ctx.mark_seen(strategy.entity_key(node)) {
            return Ok(());
        }
        self.stats.nodes += 1;

        let subject = strategy.resolve_subject(node, &mut self.ctx)?;
        for label in &node.labels {
            if !strategy.include_label(label.as_str()) {
                continue;
            }
            let class = strategy.term_iri(label.as_str(), &self.ctx)?;
            self.emit(sink, Triple::new(subject.clone(), NamedNode::rdf_type(), class))?;
        }
        for (key, value) in &node.properties {
            if !strategy.include_property(key) {
                continue;
            }
            let predicate = strategy.term_iri(key, &self.ctx)?;
            for scalar in value.scalars() {
                let object = TypedLiteralEncoder::encode(scalar);
                self.emit(sink, Triple::new(subject.clone(), predicate.clone(), object))?;
            }
        }
        Ok(())
    }

    fn project_relationship<S>(&mut self, rel: &Relationship, sink: &mut S) -> ProjectionResult<()>
    where
        S: TripleSink + ?Sized,
    {
        let strategy = self.strategy;
        self.stats.relationships += 1;
        let subject = strategy.resolve_subject(&rel.start, &mut self.ctx)?;
        let predicate = strategy.term_iri(rel.rel_type.as_str(), &self.ctx)?;
        let object = RdfObject::from(strategy.resolve_subject(&rel.end, &mut self.ctx)?);
        self.emit(sink, Triple::new(subject, predicate, object))
    }

    fn emit<S>(&mut self, sink: &mut S, triple: Triple) -> ProjectionResult<()>
    where
        S: TripleSink + ?Sized,
    {
        sink.emit(&triple)?;
        self.stats.triples += 1;
        Ok(())
    }
}

/// Columns of an ad-hoc statement export row
pub const EXPORT_SUBJECT: &str = "subject";
pub const EXPORT_PREDICATE: &str = "predicate";
pub const EXPORT_OBJECT: &str = "object";

/// Turn rows of pre-formed `subject`, `predicate`, `object` columns into
/// `<base+subject> <base+predicate> object` triples. Rows missing a column
/// are skipped.
pub fn export_statements<I, S>(rows: I, base: &str, sink: &mut S) -> ProjectionResult<ProjectionStats>
where
    I: IntoIterator<Item = QueryResult<Row>>,
    S: TripleSink + ?Sized,
{
    let mut stats = ProjectionStats::default();
    for row in rows {
        let row = row?;
        stats.rows += 1;
        let (subject, predicate, object) = match (
            scalar_column(&row, EXPORT_SUBJECT),
            scalar_column(&row, EXPORT_PREDICATE),
            scalar_column(&row, EXPORT_OBJECT),
        ) {
            (Some(s), Some(p), Some(o)) => (s, p, o),
            _ => {
                warn!(row = stats.rows, "Skipping export row without subject/predicate/object");
                continue;
            }
        };
        let triple = Triple::new(
            named_node(format!("{}{}", base, encode_local_name(&subject.to_string())))?,
            named_node(format!("{}{}", base, encode_local_name(&predicate.to_string())))?,
            TypedLiteralEncoder::encode(object),
        );
        sink.emit(&triple)?;
        stats.triples += 1;
    }
    debug!(rows = stats.rows, triples = stats.triples, "Statement export finished");
    Ok(stats)
}

fn scalar_column<'r>(row: &'r Row, column: &str) -> Option<&'r PropertyValue> {
    row.get(column).and_then(Value::as_scalar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{PreservedUri, SyntheticId};

    fn context() -> RequestContext {
        RequestContext::new(Arc::new(ProjectionSettings::default()), NamespaceMapping::new())
    }

    fn person(id: u64) -> Arc<Node> {
        Arc::new(
            Node::new(id)
                .with_label("Person")
                .with_property("name", format!("p{}", id)),
        )
    }

    fn ok_rows(rows: Vec<Row>) -> Vec<QueryResult<Row>> {
        rows.into_iter().map(Ok).collect()
    }

    #[test]
    fn test_synthetic_node_counts() {
        let node = Arc::new(
            Node::new(1)
                .with_label("Person")
                .with_label("Employee")
                .with_property("name", "Ann")
                .with_property("tags", vec!["a", "b", "c"]),
        );
        let mut projector = TripleProjector::new(&SyntheticId, context());
        let mut out = Vec::new();
        projector
            .project(ok_rows(vec![Row::new().with("n", node)]), &mut out)
            .unwrap();
        // 2 labels + 1 name + 3 tags
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|t| t.subject.key() == "neo4j://indiv#1"));
    }

    #[test]
    fn test_repeated_node_projected_once() {
        let mut projector = TripleProjector::new(&SyntheticId, context());
        let mut out = Vec::new();
        let rows = vec![Row::new().with("n", person(1)), Row::new().with("n", person(1))];
        let stats = projector.project(ok_rows(rows), &mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.nodes, 1);
    }

    #[test]
    fn test_relationships_are_not_deduplicated() {
        let rel = Relationship::new(5, "KNOWS", person(1), person(2));
        let mut projector = TripleProjector::new(&SyntheticId, context());
        let mut out = Vec::new();
        let rows = vec![
            Row::new().with("r", rel.clone()),
            Row::new().with("r", rel),
        ];
        projector.project(ok_rows(rows), &mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[0].predicate.as_str(), "neo4j://vocabulary#KNOWS");
        assert_eq!(out[0].object.to_string(), "<neo4j://indiv#2>");
    }

    #[test]
    fn test_scalars_and_nulls_ignored() {
        let mut projector = TripleProjector::new(&SyntheticId, context());
        let mut out = Vec::new();
        let rows = vec![Row::new()
            .with("count", PropertyValue::Int64(3))
            .with("missing", Value::Null)];
        let stats = projector.project(ok_rows(rows), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(stats.rows, 1);
    }

    #[test]
    fn test_preserved_node_skips_uri_and_import_labels() {
        let node = Arc::new(
            Node::new(1)
                .with_label("Resource")
                .with_label("Person")
                .with_property("uri", "http://ex.org/a"),
        );
        let mut projector = TripleProjector::new(&PreservedUri, context());
        let mut out = Vec::new();
        projector
            .project(ok_rows(vec![Row::new().with("x", node)]), &mut out)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].to_string(),
            "<http://ex.org/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <neo4j://vocabulary#Person> ."
        );
    }

    #[test]
    fn test_preserved_node_with_http_looking_names() {
        let node = Arc::new(
            Node::new(1)
                .with_label("httpStatus")
                .with_property("uri", "http://ex.org/a")
                .with_property("httpCode", 200i64),
        );
        let mut projector = TripleProjector::new(&PreservedUri, context());
        let mut out = Vec::new();
        projector
            .project(ok_rows(vec![Row::new().with("x", node)]), &mut out)
            .unwrap();
        let lines: Vec<String> = out.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "<http://ex.org/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <neo4j://vocabulary#httpStatus> .",
                "<http://ex.org/a> <neo4j://vocabulary#httpCode> \"200\"^^<http://www.w3.org/2001/XMLSchema#long> .",
            ]
        );
    }

    #[test]
    fn test_blank_node_labels_never_collide() {
        let mut ctx = context();
        let from_text = ctx.blank_node_for("_:node7");
        let from_id = ctx.blank_node_for_id(NodeId::new(7));
        assert_ne!(from_text, from_id);
        assert_eq!(from_id.as_str(), "node7");
        assert_eq!(ctx.blank_node_for("_:node7"), from_text);
        assert_ne!(ctx.blank_node_for("#7"), from_id);

        let claims_label = Arc::new(Node::new(1).with_property("uri", "_:node7"));
        let lacks_uri = Arc::new(Node::new(7));
        let rel = Relationship::new(3, "http://ex.org/p", claims_label, lacks_uri);
        let mut projector = TripleProjector::new(&PreservedUri, context());
        let mut out = Vec::new();
        projector.project(ok_rows(vec![Row::new().with("r", rel)]), &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_ne!(out[0].subject.to_string(), out[0].object.to_string());
        assert_eq!(out[0].object.to_string(), "_:node7");
    }

    #[test]
    fn test_query_error_stops_projection() {
        let mut projector = TripleProjector::new(&SyntheticId, context());
        let mut out = Vec::new();
        let rows: Vec<QueryResult<Row>> = vec![
            Ok(Row::new().with("n", person(1))),
            Err(QueryError::Execution("boom".to_string())),
            Ok(Row::new().with("n", person(2))),
        ];
        let err = projector.project(rows, &mut out).unwrap_err();
        assert!(matches!(err, ProjectionError::Query(_)));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_export_statements() {
        let rows = vec![
            Row::new()
                .with("subject", PropertyValue::from("alice"))
                .with("predicate", PropertyValue::from("age"))
                .with("object", PropertyValue::Int64(30)),
            Row::new().with("subject", PropertyValue::from("bob")),
            Row::new()
                .with("subject", PropertyValue::from("bob"))
                .with("predicate", PropertyValue::from("name"))
                .with("object", PropertyValue::from("Bob")),
        ];
        let mut out = Vec::new();
        let stats = export_statements(ok_rows(rows), "http://neo4j.com/", &mut out).unwrap();
        assert_eq!(stats.rows, 3);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].subject.key(), "http://neo4j.com/alice");
        assert_eq!(
            out[0].object.as_literal().unwrap().datatype(),
            "http://www.w3.org/2001/XMLSchema#long"
        );
        assert_eq!(out[1].object.to_string(), "\"Bob\"");
    }
}
