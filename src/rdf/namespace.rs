//! Namespace prefix management
//!
//! Graphs imported from RDF store compacted names such as `ns0_name`, where
//! the `ns0` token is a prefix whose IRI stem is persisted in the metadata
//! store. A fresh [`NamespaceMapping`] is loaded for every request.

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Metadata store errors
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The store could not be reached or read
    #[error("Metadata store unavailable: {0}")]
    Unavailable(String),
}

/// Namespace errors
#[derive(Error, Debug)]
pub enum NamespaceError {
    /// Loading failed; no partial mapping is ever returned
    #[error("Failed to load namespaces: {0}")]
    Load(#[from] MetadataError),
}

pub type NamespaceResult<T> = Result<T, NamespaceError>;

/// Source of persisted (namespace IRI stem, prefix) pairs
pub trait NamespaceStore: Send + Sync {
    /// Every persisted pair; an empty store yields an empty vector
    fn namespace_pairs(&self) -> Result<Vec<(String, String)>, MetadataError>;
}

/// Prefix → IRI stem mapping for one request
#[derive(Debug, Clone, Default)]
pub struct NamespaceMapping {
    prefixes: IndexMap<String, String>,
}

impl NamespaceMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prefix; returns false and keeps the existing stem if the prefix
    /// is already mapped
    pub fn insert(&mut self, prefix: impl Into<String>, stem: impl Into<String>) -> bool {
        let prefix = prefix.into();
        if self.prefixes.contains_key(&prefix) {
            return false;
        }
        self.prefixes.insert(prefix, stem.into());
        true
    }

    /// IRI stem of `prefix`
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// First prefix mapped to `stem`
    pub fn resolve_iri_stem(&self, stem: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, s)| s.as_str() == stem)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// (prefix, stem) pairs in load order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// Loads namespace mappings from a [`NamespaceStore`]
pub struct NamespaceRegistry;

impl NamespaceRegistry {
    /// Read all persisted pairs into a fresh mapping
    pub fn load(store: &dyn NamespaceStore) -> NamespaceResult<NamespaceMapping> {
        let mut mapping = NamespaceMapping::new();
        for (stem, prefix) in store.namespace_pairs()? {
            if !mapping.insert(prefix.as_str(), stem.as_str()) {
                warn!(prefix = %prefix, stem = %stem, "Duplicate namespace prefix ignored");
            }
        }
        debug!(count = mapping.len(), "Loaded namespace prefixes");
        Ok(mapping)
    }
}
