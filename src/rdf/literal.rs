//! Property value → typed RDF literal

use super::types::Literal;
use crate::graph::PropertyValue;
use oxrdf::vocab::xsd;

/// Converts scalar property values into literals.
///
/// Total: every value maps to some literal. Text stays a plain literal,
/// numbers and booleans get their XSD datatype, anything else falls back to a
/// plain literal of its textual form.
pub struct TypedLiteralEncoder;

impl TypedLiteralEncoder {
    pub fn encode(value: &PropertyValue) -> Literal {
        match value {
            PropertyValue::String(s) => Literal::new_simple_literal(s.as_str()),
            PropertyValue::Int32(i) => Literal::new_typed_literal(i.to_string(), xsd::INT),
            PropertyValue::Int64(i) => Literal::new_typed_literal(i.to_string(), xsd::LONG),
            PropertyValue::Float32(f) => Literal::new_typed_literal(float_lexical(*f as f64, f.to_string()), xsd::FLOAT),
            PropertyValue::Float64(f) => Literal::new_typed_literal(float_lexical(*f, f.to_string()), xsd::DOUBLE),
            PropertyValue::Boolean(b) => Literal::new_typed_literal(b.to_string(), xsd::BOOLEAN),
            other => Literal::new_simple_literal(other.to_string()),
        }
    }
}

/// XSD spells infinities `INF`/`-INF`; Rust prints `inf`
fn float_lexical(value: f64, display: String) -> String {
    if value.is_infinite() {
        if value > 0.0 { "INF".to_string() } else { "-INF".to_string() }
    } else {
        display
    }
}
