//! Streaming JSON-LD writer
//!
//! Output is a single document `{"@context": {...}, "@graph": [...]}`. Only
//! the node object of the current subject is buffered; it is written out as
//! soon as a triple with a different subject arrives. A subject that recurs
//! later in the stream gets a second node object, which JSON-LD processors
//! merge.

use crate::rdf::{Literal, RdfObject, Triple};
use indexmap::IndexMap;
use oxrdf::vocab::rdf;
use serde_json::{json, Map, Value as JsonValue};
use std::io::{self, Write};

/// Node object under construction
struct NodeObject {
    id: String,
    types: Vec<JsonValue>,
    properties: IndexMap<String, Vec<JsonValue>>,
}

impl NodeObject {
    fn new(id: String) -> Self {
        Self {
            id,
            types: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        object.insert("@id".to_string(), JsonValue::String(self.id.clone()));
        if !self.types.is_empty() {
            object.insert("@type".to_string(), JsonValue::Array(self.types.clone()));
        }
        for (predicate, values) in &self.properties {
            object.insert(predicate.clone(), JsonValue::Array(values.clone()));
        }
        JsonValue::Object(object)
    }
}

/// JSON-LD writer
pub struct JsonLdWriter<W: Write> {
    out: W,
    written: usize,
    current: Option<NodeObject>,
}

impl<W: Write> JsonLdWriter<W> {
    /// Write the document head; `prefixes` become the `@context`
    pub fn new(mut out: W, prefixes: &[(String, String)]) -> io::Result<Self> {
        let context: Map<String, JsonValue> = prefixes
            .iter()
            .map(|(prefix, namespace)| (prefix.clone(), JsonValue::String(namespace.clone())))
            .collect();
        out.write_all(b"{\"@context\":")?;
        serde_json::to_writer(&mut out, &context)?;
        out.write_all(b",\"@graph\":[")?;
        Ok(Self {
            out,
            written: 0,
            current: None,
        })
    }

    pub fn emit(&mut self, triple: &Triple) -> io::Result<()> {
        let id = triple.subject.key();
        if self.current.as_ref().map(|node| node.id.as_str()) != Some(id.as_str()) {
            self.flush_node()?;
            self.current = Some(NodeObject::new(id));
        }
        if let Some(node) = self.current.as_mut() {
            match &triple.object {
                RdfObject::NamedNode(class) if triple.predicate.as_str() == rdf::TYPE.as_str() => {
                    node.types.push(JsonValue::String(class.as_str().to_string()));
                }
                object => {
                    node.properties
                        .entry(triple.predicate.as_str().to_string())
                        .or_default()
                        .push(object_value(object));
                }
            }
        }
        Ok(())
    }

    /// Close the document and return the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_node()?;
        self.out.write_all(b"\n]}\n")?;
        Ok(self.out)
    }

    fn flush_node(&mut self) -> io::Result<()> {
        if let Some(node) = self.current.take() {
            if self.written > 0 {
                self.out.write_all(b",")?;
            }
            self.out.write_all(b"\n")?;
            serde_json::to_writer(&mut self.out, &node.to_json())?;
            self.written += 1;
        }
        Ok(())
    }
}

fn object_value(object: &RdfObject) -> JsonValue {
    match object {
        RdfObject::NamedNode(n) => json!({ "@id": n.as_str() }),
        RdfObject::BlankNode(b) => json!({ "@id": b.to_string() }),
        RdfObject::Literal(l) => literal_value(l),
    }
}

fn literal_value(literal: &Literal) -> JsonValue {
    if let Some(language) = literal.language() {
        json!({ "@value": literal.value(), "@language": language })
    } else if literal.is_plain() {
        json!({ "@value": literal.value() })
    } else {
        json!({ "@value": literal.value(), "@type": literal.datatype() })
    }
}
