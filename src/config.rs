//! Endpoint configuration
//!
//! Loaded from a YAML file; every field has a default so a partial file (or
//! no file at all) is valid.

use crate::rdf::{NamedNode, ProjectionSettings, UnresolvedPrefixPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7474,
        }
    }
}

/// Namespaces used when minting IRIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespacesConfig {
    pub vocabulary: String,
    pub vocabulary_prefix: String,
    pub individual: String,
    pub individual_prefix: String,
    pub export_base: String,
}

impl Default for NamespacesConfig {
    fn default() -> Self {
        let defaults = ProjectionSettings::default();
        Self {
            vocabulary: defaults.vocabulary,
            vocabulary_prefix: defaults.vocabulary_prefix,
            individual: defaults.individual,
            individual_prefix: defaults.individual_prefix,
            export_base: defaults.export_base,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Handling of `nsN_` names whose prefix is unknown
    pub unresolved_prefix: UnresolvedPrefixPolicy,
}

/// Response streaming
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bytes buffered before a body chunk is sent
    pub chunk_size: usize,
    /// Chunks in flight between the projection task and the connection
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8192,
            channel_capacity: 16,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// JSON graph fixture loaded at start-up
    pub fixture: Option<PathBuf>,
}

/// Complete endpoint configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub server: ServerConfig,
    pub namespaces: NamespacesConfig,
    pub projection: ProjectionConfig,
    pub stream: StreamConfig,
    pub graph: GraphConfig,
}

impl EndpointConfig {
    /// Load and validate a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let ns = &self.namespaces;
        for (name, value) in [
            ("namespaces.vocabulary", &ns.vocabulary),
            ("namespaces.individual", &ns.individual),
            ("namespaces.export_base", &ns.export_base),
        ] {
            if NamedNode::new(value.as_str()).is_err() {
                return Err(ConfigError::Invalid(format!("{} is not an absolute IRI: {}", name, value)));
            }
        }
        if ns.vocabulary_prefix.is_empty() || ns.individual_prefix.is_empty() {
            return Err(ConfigError::Invalid("namespace prefixes must not be empty".to_string()));
        }
        if self.stream.chunk_size == 0 {
            return Err(ConfigError::Invalid("stream.chunk_size must be positive".to_string()));
        }
        if self.stream.channel_capacity == 0 {
            return Err(ConfigError::Invalid("stream.channel_capacity must be positive".to_string()));
        }
        Ok(())
    }

    /// `address:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }

    pub fn projection_settings(&self) -> ProjectionSettings {
        let ns = &self.namespaces;
        ProjectionSettings {
            vocabulary: ns.vocabulary.clone(),
            vocabulary_prefix: ns.vocabulary_prefix.clone(),
            individual: ns.individual.clone(),
            individual_prefix: ns.individual_prefix.clone(),
            export_base: ns.export_base.clone(),
            unresolved_prefix: self.projection.unresolved_prefix,
        }
    }
}
