//! Streaming TriX writer

use crate::rdf::{RdfObject, RdfSubject, Triple};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, Write};

const TRIX_NAMESPACE: &str = "http://www.w3.org/2004/03/trix/trix-1/";

/// Writes one `<graph>` holding every emitted triple
pub struct TriXWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> TriXWriter<W> {
    pub fn new(out: W) -> io::Result<Self> {
        let mut this = Self {
            writer: Writer::new_with_indent(out, b' ', 2),
        };
        this.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("TriX");
        root.push_attribute(("xmlns", TRIX_NAMESPACE));
        this.write(Event::Start(root))?;
        this.write(Event::Start(BytesStart::new("graph")))?;
        Ok(this)
    }

    pub fn emit(&mut self, triple: &Triple) -> io::Result<()> {
        self.write(Event::Start(BytesStart::new("triple")))?;
        match &triple.subject {
            RdfSubject::NamedNode(n) => self.element("uri", None, n.as_str())?,
            RdfSubject::BlankNode(b) => self.element("id", None, b.as_str())?,
        }
        self.element("uri", None, triple.predicate.as_str())?;
        match &triple.object {
            RdfObject::NamedNode(n) => self.element("uri", None, n.as_str())?,
            RdfObject::BlankNode(b) => self.element("id", None, b.as_str())?,
            RdfObject::Literal(l) => {
                if let Some(language) = l.language() {
                    self.element("plainLiteral", Some(("xml:lang", language)), l.value())?
                } else if l.is_plain() {
                    self.element("plainLiteral", None, l.value())?
                } else {
                    self.element("typedLiteral", Some(("datatype", l.datatype())), l.value())?
                }
            }
        }
        self.write(Event::End(BytesEnd::new("triple")))
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.write(Event::End(BytesEnd::new("graph")))?;
        self.write(Event::End(BytesEnd::new("TriX")))?;
        let mut out = self.writer.into_inner();
        out.write_all(b"\n")?;
        Ok(out)
    }

    fn element(&mut self, name: &str, attribute: Option<(&str, &str)>, text: &str) -> io::Result<()> {
        let mut start = BytesStart::new(name);
        if let Some(attribute) = attribute {
            start.push_attribute(attribute);
        }
        self.write(Event::Start(start))?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn write(&mut self, event: Event<'_>) -> io::Result<()> {
        self.writer.write_event(event).map_err(map_err)
    }
}

/// Keep the io error kind so a broken pipe stays recognisable
fn map_err(error: quick_xml::Error) -> io::Error {
    match error {
        quick_xml::Error::Io(error) => io::Error::new(error.kind(), error.to_string()),
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{BlankNode, Literal, NamedNode};
    use oxrdf::vocab::xsd;

    #[test]
    fn test_trix_document() {
        let mut writer = TriXWriter::new(Vec::new()).unwrap();
        writer
            .emit(&Triple::new(
                NamedNode::new("http://example.org/a").unwrap(),
                NamedNode::new("http://example.org/age").unwrap(),
                Literal::new_typed_literal("34", xsd::INT),
            ))
            .unwrap();
        writer
            .emit(&Triple::new(
                BlankNode::with_id("b1").unwrap(),
                NamedNode::new("http://example.org/name").unwrap(),
                Literal::new_simple_literal("a < b"),
            ))
            .unwrap();
        let output = String::from_utf8(writer.finish().unwrap()).unwrap();

        assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(output.contains("<TriX xmlns=\"http://www.w3.org/2004/03/trix/trix-1/\">"));
        assert!(output.contains(
            "<typedLiteral datatype=\"http://www.w3.org/2001/XMLSchema#int\">34</typedLiteral>"
        ));
        assert!(output.contains("<id>b1</id>"));
        assert!(output.contains("<plainLiteral>a &lt; b</plainLiteral>"));
        assert_eq!(output.matches("<triple>").count(), 2);
        assert!(output.trim_end().ends_with("</TriX>"));
    }
}
