//! Node implementation for the property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A node in the property graph
///
/// Labels form a set; both labels and properties keep their insertion order,
/// which is the order triples are produced in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Engine-assigned identifier
    pub id: NodeId,

    /// Set of labels for this node
    #[serde(default)]
    pub labels: IndexSet<Label>,

    /// Properties associated with this node
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Node {
    /// Create a node without labels or properties
    pub fn new(id: impl Into<NodeId>) -> Self {
        Node {
            id: id.into(),
            labels: IndexSet::new(),
            properties: PropertyMap::new(),
        }
    }

    /// Builder-style label addition
    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.add_label(label);
        self
    }

    /// Builder-style property assignment
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Add a label to this node
    pub fn add_label(&mut self, label: impl Into<Label>) -> bool {
        self.labels.insert(label.into())
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.as_str() == label)
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}
