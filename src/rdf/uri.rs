//! Raw graph term → IRI
//!
//! A raw name is a label, property key or relationship type. Three shapes are
//! recognised:
//!
//! - `ns3_local`: a compacted name, expanded with the stem of prefix `ns3`
//! - `http…`: used as is when it is a valid absolute IRI
//! - anything else: appended to the vocabulary namespace

use super::namespace::NamespaceMapping;
use super::types::NamedNode;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Characters that may not appear in an IRI
const NOT_IRI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// URI construction errors
#[derive(Error, Debug)]
pub enum UriError {
    /// `nsN_` token with no persisted stem, under [`UnresolvedPrefixPolicy::Fail`]
    #[error("Unresolved namespace prefix `{prefix}` in `{name}`")]
    UnresolvedPrefix { prefix: String, name: String },

    /// Concatenation did not produce an absolute IRI
    #[error("Invalid IRI `{iri}`: {reason}")]
    InvalidIri { iri: String, reason: String },
}

pub type UriResult<T> = Result<T, UriError>;

/// What to do with a compacted name whose prefix is not in the mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPrefixPolicy {
    /// Treat the whole raw name as a vocabulary term
    #[default]
    VocabularyFallback,
    /// Abort the request
    Fail,
}

fn compacted_name() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(ns\d+)_(.*)$").expect("compacted name pattern is valid"))
}

/// Percent-encode characters that are not allowed in IRIs
pub fn encode_local_name(name: &str) -> String {
    utf8_percent_encode(name, NOT_IRI).to_string()
}

/// Validate a concatenated IRI
pub fn named_node(iri: String) -> UriResult<NamedNode> {
    NamedNode::new(iri.as_str()).map_err(|e| UriError::InvalidIri {
        iri,
        reason: e.to_string(),
    })
}

/// Builds IRIs for one request. Pure: the same raw name always yields the
/// same IRI.
#[derive(Debug, Clone, Copy)]
pub struct UriBuilder<'a> {
    vocabulary: &'a str,
    namespaces: &'a NamespaceMapping,
    policy: UnresolvedPrefixPolicy,
}

impl<'a> UriBuilder<'a> {
    pub fn new(
        vocabulary: &'a str,
        namespaces: &'a NamespaceMapping,
        policy: UnresolvedPrefixPolicy,
    ) -> Self {
        Self {
            vocabulary,
            namespaces,
            policy,
        }
    }

    /// Expand `raw_name` into an IRI
    pub fn build(&self, raw_name: &str) -> UriResult<NamedNode> {
        if let Some(caps) = compacted_name().captures(raw_name) {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let local = caps.get(2).map_or("", |m| m.as_str());
            return match self.namespaces.resolve_prefix(prefix) {
                Some(stem) => named_node(format!("{}{}", stem, encode_local_name(local))),
                None => match self.policy {
                    UnresolvedPrefixPolicy::VocabularyFallback => self.vocabulary_term(raw_name),
                    UnresolvedPrefixPolicy::Fail => Err(UriError::UnresolvedPrefix {
                        prefix: prefix.to_string(),
                        name: raw_name.to_string(),
                    }),
                },
            };
        }
        if raw_name.starts_with("http") {
            if let Ok(iri) = NamedNode::new(raw_name) {
                return Ok(iri);
            }
        }
        self.vocabulary_term(raw_name)
    }

    /// `vocabulary + name`, without prefix expansion
    pub fn vocabulary_term(&self, name: &str) -> UriResult<NamedNode> {
        named_node(format!("{}{}", self.vocabulary, encode_local_name(name)))
    }
}
