//! Result rows handed out by a query engine
//!
//! A row binds column names to values in the order the query returned them.

use crate::graph::{EdgeId, EdgeType, Node, PropertyValue};
use indexmap::IndexMap;
use std::sync::Arc;

/// A relationship as seen in a result row, with both endpoints resolved
#[derive(Debug, Clone)]
pub struct Relationship {
    pub id: EdgeId,
    pub rel_type: EdgeType,
    pub start: Arc<Node>,
    pub end: Arc<Node>,
}

impl Relationship {
    pub fn new(id: impl Into<EdgeId>, rel_type: impl Into<EdgeType>, start: Arc<Node>, end: Arc<Node>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            start,
            end,
        }
    }
}

/// Value types that can be bound to a column
#[derive(Debug, Clone)]
pub enum Value {
    /// A graph node
    Node(Arc<Node>),
    /// A graph relationship
    Relationship(Relationship),
    /// A scalar (or list of scalars)
    Scalar(PropertyValue),
    /// Null
    Null,
}

impl Value {
    /// Get as node if this is a node value
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Get as relationship if this is a relationship value
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Value::Relationship(rel) => Some(rel),
            _ => None,
        }
    }

    /// Get as scalar if this is a scalar value
    pub fn as_scalar(&self) -> Option<&PropertyValue> {
        match self {
            Value::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<Arc<Node>> for Value {
    fn from(node: Arc<Node>) -> Self {
        Value::Node(node)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(Arc::new(node))
    }
}

impl From<Relationship> for Value {
    fn from(rel: Relationship) -> Self {
        Value::Relationship(rel)
    }
}

impl From<PropertyValue> for Value {
    fn from(value: PropertyValue) -> Self {
        Value::Scalar(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A single result row
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Column bindings in query order
    columns: IndexMap<String, Value>,
}

impl Row {
    /// Create a new empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(column, value);
        self
    }

    /// Bind a column to a value
    pub fn bind(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Get a bound value
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Iterate over (column, value) pairs in query order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over values in query order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
