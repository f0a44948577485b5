//! Samyama RDF Endpoint
//!
//! Streams property-graph query results as RDF. Rows coming out of a query
//! (nodes, relationships, scalars) are projected into triples one row at a
//! time and written straight into the response body in the syntax the client
//! asked for, so output starts before the result set is complete and memory
//! use does not grow with it.
//!
//! # Architecture
//!
//! - `graph`: property graph model and an in-memory store
//! - `query`: the query engine seam (read transactions, lazy row streams) and
//!   an in-memory engine
//! - `rdf`: the projection core: typed literals, namespace prefixes, IRI
//!   construction, identity strategies, triple projection, serializers
//! - `http`: axum endpoints streaming the serialized output
//! - `config`: YAML configuration
//!
//! # Identity strategies
//!
//! - Synthetic ids: node `42` becomes `<neo4j://indiv#42>`, label `Person`
//!   becomes `<neo4j://vocabulary#Person>`.
//! - Preserved URIs: for graphs imported from RDF, the `uri` property is the
//!   subject and compacted names like `ns0_name` are expanded back with the
//!   persisted namespace prefixes.
//!
//! ## Example Usage
//!
//! ```rust
//! use samyama_rdf_endpoint::graph::{Edge, GraphStore, Node};
//! use samyama_rdf_endpoint::query::{GraphQuery, MemoryEngine, ResultStream};
//! use samyama_rdf_endpoint::rdf::{
//!     NamespaceRegistry, ProjectionSettings, RequestContext, SyntheticId, TripleProjector,
//! };
//! use std::sync::Arc;
//!
//! let mut store = GraphStore::new();
//! store.add_node(Node::new(1).with_label("Person").with_property("name", "Alice")).unwrap();
//! store.add_node(Node::new(2).with_label("Person").with_property("name", "Bob")).unwrap();
//! store.add_edge(Edge::new(1, 1, 2, "KNOWS")).unwrap();
//! let engine = MemoryEngine::new(store);
//!
//! let namespaces = NamespaceRegistry::load(&engine).unwrap();
//! let ctx = RequestContext::new(Arc::new(ProjectionSettings::default()), namespaces);
//! let rows = ResultStream::open(&engine, &GraphQuery::cypher("MATCH (a)-[r]->(b) RETURN a, r, b")).unwrap();
//!
//! let mut triples = Vec::new();
//! let stats = TripleProjector::new(&SyntheticId, ctx).project(rows, &mut triples).unwrap();
//!
//! // two labels, two names, one relationship
//! assert_eq!(stats.triples, 5);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod http;
pub mod query;
pub mod rdf;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, EndpointConfig};

pub use graph::{
    Edge, EdgeId, EdgeType, GraphError, GraphFixture, GraphResult, GraphStore, Label, Node,
    NodeId, PropertyMap, PropertyValue,
};

pub use query::{GraphQuery, MemoryEngine, QueryEngine, QueryError, ResultStream, Row, Value};

pub use rdf::{
    IdentityStrategy, NamespaceMapping, NamespaceRegistry, NamespaceStore, PreservedUri,
    ProjectionSettings, RdfFormat, RdfSerializer, RequestContext, SyntheticId, Triple,
    TripleProjector,
};

pub use http::{router, AppState, EndpointError, HttpServer};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
