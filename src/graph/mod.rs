//! Property graph data model
//!
//! This module implements the graph side of the projection:
//! - Nodes with a label set and typed, possibly multi-valued properties
//! - Directed, typed relationships between nodes
//! - An in-memory store used as the reference query collaborator

pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphFixture, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
