//! Bridging to the rio formatters (Turtle, N3, N-Triples, TriG, RDF/XML)

use crate::rdf::{Literal, RdfObject, RdfSubject, Triple};
use rio_api::model;
use std::io::{self, Write};

/// Borrow `triple` as a rio triple
pub fn to_rio_triple(triple: &Triple) -> model::Triple<'_> {
    let subject = match &triple.subject {
        RdfSubject::NamedNode(n) => model::Subject::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfSubject::BlankNode(b) => model::Subject::BlankNode(model::BlankNode { id: b.as_str() }),
    };
    let object = match &triple.object {
        RdfObject::NamedNode(n) => model::Term::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfObject::BlankNode(b) => model::Term::BlankNode(model::BlankNode { id: b.as_str() }),
        RdfObject::Literal(l) => model::Term::Literal(to_rio_literal(l)),
    };
    model::Triple {
        subject,
        predicate: model::NamedNode {
            iri: triple.predicate.as_str(),
        },
        object,
    }
}

/// Borrow `triple` as a rio quad in the default graph
pub fn to_rio_quad(triple: &Triple) -> model::Quad<'_> {
    let model::Triple {
        subject,
        predicate,
        object,
    } = to_rio_triple(triple);
    model::Quad {
        subject,
        predicate,
        object,
        graph_name: None,
    }
}

fn to_rio_literal(literal: &Literal) -> model::Literal<'_> {
    if let Some(language) = literal.language() {
        model::Literal::LanguageTaggedString {
            value: literal.value(),
            language,
        }
    } else if literal.is_plain() {
        model::Literal::Simple {
            value: literal.value(),
        }
    } else {
        model::Literal::Typed {
            value: literal.value(),
            datatype: model::NamedNode {
                iri: literal.datatype(),
            },
        }
    }
}

/// Write `@prefix` directives. Prefixes that are not valid Turtle prefix
/// names are left out; the body always uses full IRIs.
pub fn write_prefixes<W: Write>(out: &mut W, prefixes: &[(String, String)]) -> io::Result<()> {
    let mut written = false;
    for (prefix, namespace) in prefixes {
        if is_prefix_name(prefix) && !namespace.contains('>') {
            writeln!(out, "@prefix {}: <{}> .", prefix, namespace)?;
            written = true;
        }
    }
    if written {
        writeln!(out)?;
    }
    Ok(())
}

fn is_prefix_name(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    !prefix.ends_with('.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}
