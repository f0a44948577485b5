//! Property value types for graph nodes
//!
//! Values are a closed set of runtime types. Anything the engine hands over
//! that is not one of the literal-mappable scalars travels as `Other` in its
//! textual form, so downstream code can always fall back to a plain string.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property value as produced by the query engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum PropertyValue {
    String(String),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    /// Multi-valued property: an ordered, homogeneous sequence of scalars
    List(Vec<PropertyValue>),
    /// Temporal, spatial, map or any other engine type, in textual form
    Other(String),
}

impl PropertyValue {
    /// Whether this is a multi-valued property
    pub fn is_list(&self) -> bool {
        matches!(self, PropertyValue::List(_))
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get an integer value of either width
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Int32(i) => Some(i64::from(*i)),
            PropertyValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// The individual scalars carried by this value.
    ///
    /// A scalar yields itself; a list yields its elements in order.
    pub fn scalars(&self) -> std::slice::Iter<'_, PropertyValue> {
        match self {
            PropertyValue::List(items) => items.iter(),
            scalar => std::slice::from_ref(scalar).iter(),
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Int32(_) => "Int32",
            PropertyValue::Int64(_) => "Int64",
            PropertyValue::Float32(_) => "Float32",
            PropertyValue::Float64(_) => "Float64",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::List(_) => "List",
            PropertyValue::Other(_) => "Other",
        }
    }

    /// JSON rendering used by fixtures and diagnostics
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
            PropertyValue::Int32(i) => (*i).into(),
            PropertyValue::Int64(i) => (*i).into(),
            PropertyValue::Float32(f) => f64::from(*f).into(),
            PropertyValue::Float64(f) => (*f).into(),
            PropertyValue::Boolean(b) => (*b).into(),
            PropertyValue::List(items) => {
                serde_json::Value::Array(items.iter().map(PropertyValue::to_json).collect())
            }
            PropertyValue::Other(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Strings render unquoted: this is the textual form used for plain literals.
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Int32(i) => write!(f, "{}", i),
            PropertyValue::Int64(i) => write!(f, "{}", i),
            PropertyValue::Float32(fl) => write!(f, "{}", fl),
            PropertyValue::Float64(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::List(items) => {
                write!(f, "[")?;
                for (i, val) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            PropertyValue::Other(s) => f.write_str(s),
        }
    }
}

/// JSON numbers without a fraction become 64-bit integers, matching what a
/// Cypher engine returns for integer literals.
impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => PropertyValue::String(s),
            serde_json::Value::Bool(b) => PropertyValue::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Int64(i)
                } else if let Some(f) = n.as_f64() {
                    PropertyValue::Float64(f)
                } else {
                    PropertyValue::Other(n.to_string())
                }
            }
            serde_json::Value::Array(items) => {
                PropertyValue::List(items.into_iter().map(PropertyValue::from).collect())
            }
            other => PropertyValue::Other(other.to_string()),
        }
    }
}

impl From<PropertyValue> for serde_json::Value {
    fn from(value: PropertyValue) -> Self {
        value.to_json()
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int32(i)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int64(i)
    }
}

impl From<f32> for PropertyValue {
    fn from(f: f32) -> Self {
        PropertyValue::Float32(f)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float64(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(items: Vec<T>) -> Self {
        PropertyValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Property map; insertion order is kept so output is reproducible
pub type PropertyMap = IndexMap<String, PropertyValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_of_scalar_and_list() {
        let single = PropertyValue::from("Ann");
        assert_eq!(single.scalars().count(), 1);

        let multi = PropertyValue::from(vec!["a", "b", "c"]);
        assert!(multi.is_list());
        let items: Vec<String> = multi.scalars().map(|v| v.to_string()).collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_conversions_keep_width() {
        assert_eq!(PropertyValue::from(34i32).type_name(), "Int32");
        assert_eq!(PropertyValue::from(34i64).type_name(), "Int64");
        assert_eq!(PropertyValue::from(1.5f32).type_name(), "Float32");
        assert_eq!(PropertyValue::from(1.8f64).type_name(), "Float64");
        assert_eq!(PropertyValue::from(34i32).as_integer(), Some(34));
    }

    #[test]
    fn test_from_json() {
        let value: PropertyValue =
            serde_json::from_str(r#"["x", "y"]"#).unwrap();
        assert_eq!(value, PropertyValue::from(vec!["x", "y"]));

        let value: PropertyValue = serde_json::from_str("1.8").unwrap();
        assert_eq!(value, PropertyValue::Float64(1.8));

        let value: PropertyValue = serde_json::from_str("42").unwrap();
        assert_eq!(value, PropertyValue::Int64(42));

        let value: PropertyValue = serde_json::from_str(r#"{"x": 1}"#).unwrap();
        assert_eq!(value, PropertyValue::Other(r#"{"x":1}"#.to_string()));
    }

    #[test]
    fn test_display_is_unquoted() {
        assert_eq!(PropertyValue::from("Ann").to_string(), "Ann");
        assert_eq!(PropertyValue::from(true).to_string(), "true");
        assert_eq!(PropertyValue::from(vec![1i64, 2]).to_string(), "[1, 2]");
    }
}
