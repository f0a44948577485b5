//! Identity strategies
//!
//! A strategy decides which IRI (or blank node) stands for a graph node and
//! how labels, property keys and relationship types become IRIs. Two exist:
//!
//! - [`SyntheticId`]: every node is `individual namespace + numeric id`, every
//!   term lives in the vocabulary namespace.
//! - [`PreservedUri`]: for graphs imported from RDF. Nodes keep their `uri`
//!   property as subject and compacted `nsN_` terms are expanded back.

use super::projector::{ProjectionResult, RequestContext};
use super::types::{NamedNode, RdfSubject};
use super::uri::{named_node, UriResult};
use crate::graph::{Node, NodeId};

/// Property carrying the preserved IRI of an imported resource
pub const URI_PROPERTY: &str = "uri";

/// Labels added by the RDF importer that carry no type information
pub const IMPORT_LABELS: [&str; 3] = ["Resource", "URI", "BNode"];

/// Key under which a node's own statements are deduplicated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// Engine-assigned id
    Id(NodeId),
    /// Preserved IRI (or the malformed text standing in for one)
    Uri(String),
}

/// How graph identities map to RDF terms
pub trait IdentityStrategy: Send + Sync {
    /// Short name, for logging
    fn name(&self) -> &'static str;

    /// Deduplication key of `node`
    fn entity_key(&self, node: &Node) -> EntityKey;

    /// Subject term for `node`
    fn resolve_subject(&self, node: &Node, ctx: &mut RequestContext) -> ProjectionResult<RdfSubject>;

    /// Whether `label` becomes an `rdf:type` triple
    fn include_label(&self, label: &str) -> bool;

    /// Whether property `key` becomes a triple
    fn include_property(&self, key: &str) -> bool;

    /// IRI for a label, property key or relationship type
    fn term_iri(&self, raw_name: &str, ctx: &RequestContext) -> UriResult<NamedNode>;

    /// (prefix, namespace) declarations handed to the writer
    fn declared_prefixes(&self, ctx: &RequestContext) -> Vec<(String, String)>;
}

/// Numeric-id identity
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticId;

impl IdentityStrategy for SyntheticId {
    fn name(&self) -> &'static str {
        "synthetic-id"
    }

    fn entity_key(&self, node: &Node) -> EntityKey {
        EntityKey::Id(node.id)
    }

    fn resolve_subject(&self, node: &Node, ctx: &mut RequestContext) -> ProjectionResult<RdfSubject> {
        let iri = format!("{}{}", ctx.settings().individual, node.id);
        Ok(named_node(iri)?.into())
    }

    fn include_label(&self, _label: &str) -> bool {
        true
    }

    fn include_property(&self, _key: &str) -> bool {
        true
    }

    fn term_iri(&self, raw_name: &str, ctx: &RequestContext) -> UriResult<NamedNode> {
        ctx.uri_builder().vocabulary_term(raw_name)
    }

    fn declared_prefixes(&self, ctx: &RequestContext) -> Vec<(String, String)> {
        let settings = ctx.settings();
        vec![
            (settings.vocabulary_prefix.clone(), settings.vocabulary.clone()),
            (settings.individual_prefix.clone(), settings.individual.clone()),
        ]
    }
}

/// Preserved-URI identity
#[derive(Debug, Clone, Copy, Default)]
pub struct PreservedUri;

impl IdentityStrategy for PreservedUri {
    fn name(&self) -> &'static str {
        "preserved-uri"
    }

    fn entity_key(&self, node: &Node) -> EntityKey {
        match node.get_property(URI_PROPERTY) {
            Some(uri) => EntityKey::Uri(uri.to_string()),
            None => EntityKey::Id(node.id),
        }
    }

    /// A `uri` that does not parse as an absolute IRI becomes a blank node,
    /// the same one for every occurrence within the request. A node without
    /// `uri` gets a blank node derived from its id.
    fn resolve_subject(&self, node: &Node, ctx: &mut RequestContext) -> ProjectionResult<RdfSubject> {
        let subject = match node.get_property(URI_PROPERTY) {
            Some(uri) => {
                let text = uri.to_string();
                match NamedNode::new(text.as_str()) {
                    Ok(iri) => iri.into(),
                    Err(_) => ctx.blank_node_for(&text).into(),
                }
            }
            None => ctx.blank_node_for_id(node.id).into(),
        };
        Ok(subject)
    }

    fn include_label(&self, label: &str) -> bool {
        !IMPORT_LABELS.contains(&label)
    }

    fn include_property(&self, key: &str) -> bool {
        key != URI_PROPERTY
    }

    fn term_iri(&self, raw_name: &str, ctx: &RequestContext) -> UriResult<NamedNode> {
        ctx.uri_builder().build(raw_name)
    }

    fn declared_prefixes(&self, ctx: &RequestContext) -> Vec<(String, String)> {
        let settings = ctx.settings();
        let mut prefixes = vec![(settings.vocabulary_prefix.clone(), settings.vocabulary.clone())];
        prefixes.extend(
            ctx.namespaces()
                .iter()
                .filter(|(prefix, _)| *prefix != settings.vocabulary_prefix)
                .map(|(prefix, stem)| (prefix.to_string(), stem.to_string())),
        );
        prefixes
    }
}
