//! HTTP surface
//!
//! Routes:
//! - `POST /cypher`: query result as RDF with synthetic numeric-id IRIs
//! - `POST /cypheronrdf`: query result over an imported RDF graph, original URIs preserved
//! - `GET /describe/id?nodeid=…[&excludeContext]`
//! - `GET /describe/uri?nodeuri=…[&excludeContext]`
//! - `POST /export`: ad-hoc `subject`/`predicate`/`object` rows as statements
//! - `GET /ping`
//!
//! The RDF syntax is chosen from the `accept` header; JSON-LD when absent or
//! not recognised.

pub mod error;
pub mod handler;
pub mod server;
pub mod stream;

pub use error::EndpointError;
pub use server::{router, AppState, HttpServer};
pub use stream::{ChannelWriter, ProjectionMode, RdfRequest};
