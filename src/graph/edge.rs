//! Directed relationship between two nodes

use super::types::{EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
///
/// Relationship properties are not part of the RDF projection, so the stored
/// edge only carries its structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Engine-assigned identifier
    pub id: EdgeId,

    /// Relationship type (e.g., "KNOWS")
    #[serde(rename = "type")]
    pub edge_type: EdgeType,

    /// Start node (edge goes FROM this node)
    #[serde(rename = "start")]
    pub source: NodeId,

    /// End node (edge goes TO this node)
    #[serde(rename = "end")]
    pub target: NodeId,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: impl Into<EdgeType>,
    ) -> Self {
        Edge {
            id: id.into(),
            edge_type: edge_type.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}
