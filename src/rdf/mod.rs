//! Property graph → RDF projection
//!
//! This module turns query results into RDF:
//! - Typed literals for scalar property values
//! - Namespace prefixes persisted by the RDF importer
//! - IRI construction for labels, keys and relationship types
//! - Two identity strategies (synthetic numeric ids, preserved source URIs)
//! - Row-by-row triple projection with per-request node deduplication
//! - Streaming serialization (Turtle, N-Triples, RDF/XML, TriG, TriX, JSON-LD)
//!
//! # Example
//!
//! ```rust
//! use samyama_rdf_endpoint::graph::Node;
//! use samyama_rdf_endpoint::query::Row;
//! use samyama_rdf_endpoint::rdf::{
//!     NamespaceMapping, ProjectionSettings, RdfFormat, RdfSerializer, RequestContext,
//!     SyntheticId, TripleProjector,
//! };
//! use std::sync::Arc;
//!
//! let ctx = RequestContext::new(Arc::new(ProjectionSettings::default()), NamespaceMapping::new());
//! let rows = vec![Ok(Row::new().with("n", Node::new(1).with_label("Person")))];
//!
//! let mut serializer = RdfSerializer::open(RdfFormat::NTriples, Vec::new(), &[]).unwrap();
//! TripleProjector::new(&SyntheticId, ctx).project(rows, &mut serializer).unwrap();
//! let output = String::from_utf8(serializer.close().unwrap()).unwrap();
//!
//! assert!(output.starts_with("<neo4j://indiv#1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type>"));
//! ```

mod identity;
mod literal;
mod namespace;
mod projector;
mod serialization;
mod types;
mod uri;

pub use types::{BlankNode, Literal, NamedNode, RdfError, RdfObject, RdfResult, RdfSubject, Triple};

pub use literal::TypedLiteralEncoder;

pub use namespace::{
    MetadataError, NamespaceError, NamespaceMapping, NamespaceRegistry, NamespaceResult,
    NamespaceStore,
};

pub use uri::{encode_local_name, UnresolvedPrefixPolicy, UriBuilder, UriError, UriResult};

pub use identity::{EntityKey, IdentityStrategy, PreservedUri, SyntheticId, IMPORT_LABELS, URI_PROPERTY};

pub use projector::{
    export_statements, ProjectionError, ProjectionResult, ProjectionSettings, ProjectionStats,
    RequestContext, TripleProjector, TripleSink, EXPORT_OBJECT, EXPORT_PREDICATE, EXPORT_SUBJECT,
};

pub use serialization::{RdfFormat, RdfSerializer, SerializeError, SerializeResult};
