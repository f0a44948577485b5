//! RDF serialization
//!
//! Supports:
//! - RDF/XML
//! - N-Triples
//! - Turtle (also served for N3)
//! - TriG
//! - TriX
//! - JSON-LD
//!
//! [`RdfSerializer`] is a streaming writer with a strict lifecycle: `open`
//! writes the document head, `emit` writes one triple, `close` writes the
//! tail and hands back the sink. A serializer dropped without `close` still
//! finishes its document on a best-effort basis.

mod jsonld;
mod trix;
mod turtle;

pub use jsonld::JsonLdWriter;
pub use trix::TriXWriter;
pub use turtle::{to_rio_quad, to_rio_triple, write_prefixes};

use super::projector::TripleSink;
use super::Triple;
use rio_api::formatter::{QuadsFormatter, TriplesFormatter};
use rio_turtle::{NTriplesFormatter, TriGFormatter, TurtleFormatter};
use rio_xml::RdfXmlFormatter;
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    /// RDF/XML format (.rdf)
    RdfXml,
    /// N-Triples format (.nt)
    NTriples,
    /// Turtle format (.ttl)
    Turtle,
    /// Notation3 (.n3), written as Turtle
    N3,
    /// TriG format (.trig)
    TriG,
    /// TriX format (.xml)
    TriX,
    /// JSON-LD format (.jsonld)
    JsonLd,
}

impl RdfFormat {
    pub const ALL: [RdfFormat; 7] = [
        RdfFormat::RdfXml,
        RdfFormat::NTriples,
        RdfFormat::Turtle,
        RdfFormat::N3,
        RdfFormat::TriG,
        RdfFormat::TriX,
        RdfFormat::JsonLd,
    ];

    /// Registered media types; the first one is the canonical content type
    pub fn media_types(&self) -> &'static [&'static str] {
        match self {
            RdfFormat::RdfXml => &["application/rdf+xml", "application/xml", "text/xml"],
            RdfFormat::NTriples => &["application/n-triples", "text/plain"],
            RdfFormat::Turtle => &["text/turtle", "application/x-turtle"],
            RdfFormat::N3 => &["text/n3", "text/rdf+n3"],
            RdfFormat::TriG => &["application/trig", "application/x-trig"],
            RdfFormat::TriX => &["application/trix"],
            RdfFormat::JsonLd => &["application/ld+json"],
        }
    }

    /// Content type of responses in this format
    pub fn content_type(&self) -> &'static str {
        self.media_types()[0]
    }

    /// Pick the format for an `accept` value.
    ///
    /// The value is matched literally against the registered media types
    /// (ignoring media type parameters such as `charset`). Absent or unknown
    /// values give JSON-LD.
    pub fn negotiate(accept: Option<&str>) -> RdfFormat {
        let format = accept
            .and_then(|value| {
                let value = value.trim();
                Self::by_media_type(value).or_else(|| {
                    value
                        .parse::<mime::Mime>()
                        .ok()
                        .and_then(|mime| Self::by_media_type(mime.essence_str()))
                })
            })
            .unwrap_or(RdfFormat::JsonLd);
        debug!(accept = ?accept, format = %format, "Negotiated RDF format");
        format
    }

    fn by_media_type(media_type: &str) -> Option<RdfFormat> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.media_types().contains(&media_type))
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::RdfXml => "RDF/XML",
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::Turtle => "Turtle",
            RdfFormat::N3 => "N3",
            RdfFormat::TriG => "TriG",
            RdfFormat::TriX => "TriX",
            RdfFormat::JsonLd => "JSON-LD",
        };
        f.write_str(name)
    }
}

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Emit after the document was finished
    #[error("Serializer already closed")]
    Closed,
}

impl SerializeError {
    /// True when the sink went away (client disconnected)
    pub fn is_disconnect(&self) -> bool {
        matches!(self, SerializeError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

pub type SerializeResult<T> = Result<T, SerializeError>;

enum FormatWriter<W: Write> {
    Turtle(TurtleFormatter<W>),
    NTriples(NTriplesFormatter<W>),
    TriG(TriGFormatter<W>),
    RdfXml(RdfXmlFormatter<W>),
    JsonLd(JsonLdWriter<W>),
    TriX(TriXWriter<W>),
}

impl<W: Write> FormatWriter<W> {
    fn open(format: RdfFormat, mut sink: W, prefixes: &[(String, String)]) -> io::Result<Self> {
        Ok(match format {
            RdfFormat::Turtle | RdfFormat::N3 => {
                write_prefixes(&mut sink, prefixes)?;
                FormatWriter::Turtle(TurtleFormatter::new(sink))
            }
            RdfFormat::TriG => {
                write_prefixes(&mut sink, prefixes)?;
                FormatWriter::TriG(TriGFormatter::new(sink))
            }
            RdfFormat::NTriples => FormatWriter::NTriples(NTriplesFormatter::new(sink)),
            RdfFormat::RdfXml => FormatWriter::RdfXml(RdfXmlFormatter::new(sink)?),
            RdfFormat::JsonLd => FormatWriter::JsonLd(JsonLdWriter::new(sink, prefixes)?),
            RdfFormat::TriX => FormatWriter::TriX(TriXWriter::new(sink)?),
        })
    }

    fn emit(&mut self, triple: &Triple) -> io::Result<()> {
        match self {
            FormatWriter::Turtle(f) => f.format(&to_rio_triple(triple)),
            FormatWriter::NTriples(f) => f.format(&to_rio_triple(triple)),
            FormatWriter::TriG(f) => f.format(&to_rio_quad(triple)),
            FormatWriter::RdfXml(f) => {
                check_rdf_xml_predicate(triple.predicate.as_str())?;
                f.format(&to_rio_triple(triple))
            }
            FormatWriter::JsonLd(w) => w.emit(triple),
            FormatWriter::TriX(w) => w.emit(triple),
        }
    }

    fn finish(self) -> io::Result<W> {
        let mut sink = match self {
            FormatWriter::Turtle(f) => f.finish()?,
            FormatWriter::NTriples(f) => f.finish()?,
            FormatWriter::TriG(f) => f.finish()?,
            FormatWriter::RdfXml(f) => f.finish()?,
            FormatWriter::JsonLd(w) => w.finish()?,
            FormatWriter::TriX(w) => w.finish()?,
        };
        sink.flush()?;
        Ok(sink)
    }
}

/// RDF/XML writes a predicate as a qualified element name, so the IRI must
/// end in an XML NCName. The split mirrors the one `rio_xml` performs.
fn xml_local_name(iri: &str) -> Option<&str> {
    let base = iri.rfind(|c: char| !is_xml_name_char(c) || c == ':')?;
    let start = iri[base..].find(|c: char| is_xml_name_start_char(c) && c != ':')?;
    Some(&iri[base + start..])
}

fn check_rdf_xml_predicate(iri: &str) -> io::Result<()> {
    match xml_local_name(iri) {
        Some(_) => Ok(()),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Predicate <{}> has no XML local name and cannot be written as RDF/XML", iri),
        )),
    }
}

fn is_xml_name_start_char(c: char) -> bool {
    matches!(c,
        ':'
        | 'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_xml_name_char(c: char) -> bool {
    is_xml_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// Streaming RDF writer
pub struct RdfSerializer<W: Write> {
    format: RdfFormat,
    writer: Option<FormatWriter<W>>,
    emitted: u64,
}

impl<W: Write> RdfSerializer<W> {
    /// Start a document in `format`, declaring `prefixes` (prefix, namespace)
    /// where the syntax has a place for them
    pub fn open(format: RdfFormat, sink: W, prefixes: &[(String, String)]) -> SerializeResult<Self> {
        let writer = FormatWriter::open(format, sink, prefixes)?;
        Ok(Self {
            format,
            writer: Some(writer),
            emitted: 0,
        })
    }

    pub fn format(&self) -> RdfFormat {
        self.format
    }

    /// Number of triples written so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn emit(&mut self, triple: &Triple) -> SerializeResult<()> {
        let writer = self.writer.as_mut().ok_or(SerializeError::Closed)?;
        writer.emit(triple)?;
        self.emitted += 1;
        Ok(())
    }

    /// Finish the document and return the sink
    pub fn close(mut self) -> SerializeResult<W> {
        let writer = self.writer.take().ok_or(SerializeError::Closed)?;
        Ok(writer.finish()?)
    }
}

impl<W: Write> TripleSink for RdfSerializer<W> {
    fn emit(&mut self, triple: &Triple) -> SerializeResult<()> {
        RdfSerializer::emit(self, triple)
    }
}

impl<W: Write> Drop for RdfSerializer<W> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finish() {
                debug!(format = %self.format, "Failed to finish abandoned RDF document: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Literal, NamedNode};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample() -> Triple {
        Triple::new(
            NamedNode::new("http://example.org/a").unwrap(),
            NamedNode::new("http://example.org/name").unwrap(),
            Literal::new_simple_literal("Ann"),
        )
    }

    fn write_all(format: RdfFormat) -> String {
        let mut serializer = RdfSerializer::open(
            format,
            Vec::new(),
            &[("ex".to_string(), "http://example.org/".to_string())],
        )
        .unwrap();
        serializer.emit(&sample()).unwrap();
        String::from_utf8(serializer.close().unwrap()).unwrap()
    }

    #[test]
    fn test_negotiate() {
        assert_eq!(RdfFormat::negotiate(Some("text/turtle")), RdfFormat::Turtle);
        assert_eq!(RdfFormat::negotiate(Some("application/rdf+xml")), RdfFormat::RdfXml);
        assert_eq!(RdfFormat::negotiate(Some("text/plain")), RdfFormat::NTriples);
        assert_eq!(RdfFormat::negotiate(Some("text/n3")), RdfFormat::N3);
        assert_eq!(RdfFormat::negotiate(Some("application/trix")), RdfFormat::TriX);
        assert_eq!(RdfFormat::negotiate(Some("application/x-trig")), RdfFormat::TriG);
        assert_eq!(RdfFormat::negotiate(Some("application/ld+json")), RdfFormat::JsonLd);
        assert_eq!(RdfFormat::negotiate(Some("text/turtle; charset=utf-8")), RdfFormat::Turtle);
    }

    #[test]
    fn test_negotiate_defaults_to_jsonld() {
        assert_eq!(RdfFormat::negotiate(Some("foo/bar")), RdfFormat::JsonLd);
        assert_eq!(RdfFormat::negotiate(Some("")), RdfFormat::JsonLd);
        assert_eq!(RdfFormat::negotiate(None), RdfFormat::JsonLd);
    }

    #[test]
    fn test_every_format_writes_the_triple() {
        for format in RdfFormat::ALL {
            let output = write_all(format);
            assert!(output.contains("http://example.org/a"), "{}: {}", format, output);
            assert!(output.contains("Ann"), "{}: {}", format, output);
        }
    }

    #[test]
    fn test_xml_local_names() {
        assert_eq!(xml_local_name("http://schema.org/name"), Some("name"));
        assert_eq!(xml_local_name("neo4j://vocabulary#first%20name"), Some("name"));
        assert_eq!(xml_local_name("neo4j://vocabulary#2020"), None);
        assert_eq!(xml_local_name("http://schema.org/"), None);
    }

    #[test]
    fn test_rdf_xml_refuses_unqualifiable_predicate() {
        let mut serializer = RdfSerializer::open(RdfFormat::RdfXml, Vec::new(), &[]).unwrap();
        serializer.emit(&sample()).unwrap();
        let triple = Triple::new(
            NamedNode::new("http://example.org/a").unwrap(),
            NamedNode::new("neo4j://vocabulary#2020").unwrap(),
            Literal::new_simple_literal("1"),
        );
        match serializer.emit(&triple) {
            Err(SerializeError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(serializer.emitted(), 1);
    }

    #[test]
    fn test_ntriples_has_no_prefixes() {
        let output = write_all(RdfFormat::NTriples);
        assert_eq!(
            output,
            "<http://example.org/a> <http://example.org/name> \"Ann\" .\n"
        );
    }

    #[test]
    fn test_turtle_declares_prefixes() {
        let output = write_all(RdfFormat::Turtle);
        assert!(output.starts_with("@prefix ex: <http://example.org/> ."));
    }

    /// Sink that can be inspected after the serializer is gone
    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_drop_finishes_document() {
        let sink = SharedSink::default();
        {
            let mut serializer = RdfSerializer::open(RdfFormat::JsonLd, sink.clone(), &[]).unwrap();
            serializer.emit(&sample()).unwrap();
        }
        let output = sink.0.borrow().clone();
        let doc: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(doc["@graph"][0]["@id"], "http://example.org/a");
    }

    #[test]
    fn test_disconnect_detection() {
        let err = SerializeError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(err.is_disconnect());
        assert!(!SerializeError::Closed.is_disconnect());
    }
}
