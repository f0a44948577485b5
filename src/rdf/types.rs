//! RDF terms produced by the projection
//!
//! Newtypes over the oxrdf primitives. Only what the projection emits is
//! modelled: triples in the default graph, IRI predicates, no RDF-star.

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode as OxBlankNode, Literal as OxLiteral, NamedNode as OxNamedNode};
use std::fmt;
use thiserror::Error;

/// Term construction errors
#[derive(Error, Debug)]
pub enum RdfError {
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// An absolute IRI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Validate `iri` as an absolute IRI
    pub fn new(iri: impl Into<String>) -> RdfResult<Self> {
        let iri = iri.into();
        match OxNamedNode::new(iri.as_str()) {
            Ok(node) => Ok(Self(node)),
            Err(e) => Err(RdfError::InvalidIri(format!("{} ({})", iri, e))),
        }
    }

    pub fn rdf_type() -> Self {
        Self(rdf::TYPE.into_owned())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(iri: OxNamedNode) -> Self {
        Self(iri)
    }
}

/// Blank node; fresh ones get a random id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank node labelled `id`, which must be a valid blank node label
    pub fn with_id(id: &str) -> RdfResult<Self> {
        OxBlankNode::new(id)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(format!("{} ({})", id, e)))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Plain or datatyped literal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    pub fn new_typed_literal(value: impl Into<String>, datatype: impl Into<OxNamedNode>) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype))
    }

    /// Lexical form
    pub fn value(&self) -> &str {
        self.0.value()
    }

    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Datatype IRI (`xsd:string` for plain literals)
    pub fn datatype(&self) -> &str {
        self.0.datatype().as_str()
    }

    /// True for `xsd:string` literals without a language tag
    pub fn is_plain(&self) -> bool {
        self.language().is_none() && self.0.datatype() == xsd::STRING
    }
}

// oxrdf renders terms in N-Triples syntax
impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Term in subject position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfSubject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl RdfSubject {
    pub fn is_blank_node(&self) -> bool {
        matches!(self, RdfSubject::BlankNode(_))
    }

    /// The IRI, or `_:id` for a blank node
    pub fn key(&self) -> String {
        match self {
            RdfSubject::NamedNode(iri) => iri.as_str().to_owned(),
            RdfSubject::BlankNode(node) => node.to_string(),
        }
    }
}

impl From<NamedNode> for RdfSubject {
    fn from(iri: NamedNode) -> Self {
        RdfSubject::NamedNode(iri)
    }
}

impl From<BlankNode> for RdfSubject {
    fn from(node: BlankNode) -> Self {
        RdfSubject::BlankNode(node)
    }
}

/// Term in object position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfObject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl RdfObject {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            RdfObject::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl From<NamedNode> for RdfObject {
    fn from(iri: NamedNode) -> Self {
        RdfObject::NamedNode(iri)
    }
}

impl From<BlankNode> for RdfObject {
    fn from(node: BlankNode) -> Self {
        RdfObject::BlankNode(node)
    }
}

impl From<Literal> for RdfObject {
    fn from(literal: Literal) -> Self {
        RdfObject::Literal(literal)
    }
}

/// A node reference in object position: the end of a relationship
impl From<RdfSubject> for RdfObject {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(iri) => RdfObject::NamedNode(iri),
            RdfSubject::BlankNode(node) => RdfObject::BlankNode(node),
        }
    }
}

impl fmt::Display for RdfSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfSubject::NamedNode(iri) => fmt::Display::fmt(iri, f),
            RdfSubject::BlankNode(node) => fmt::Display::fmt(node, f),
        }
    }
}

impl fmt::Display for RdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfObject::NamedNode(iri) => fmt::Display::fmt(iri, f),
            RdfObject::BlankNode(node) => fmt::Display::fmt(node, f),
            RdfObject::Literal(literal) => fmt::Display::fmt(literal, f),
        }
    }
}

/// One statement; the predicate is always an IRI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: RdfSubject,
    pub predicate: NamedNode,
    pub object: RdfObject,
}

impl Triple {
    pub fn new(subject: impl Into<RdfSubject>, predicate: NamedNode, object: impl Into<RdfObject>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
}

/// N-Triples line, without the newline
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
