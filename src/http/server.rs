//! HTTP server exposing the RDF endpoints

use super::handler::{
    cypher_handler, cypher_on_rdf_handler, describe_by_id_handler, describe_by_uri_handler,
    export_handler, ping_handler,
};
use crate::config::{EndpointConfig, StreamConfig};
use crate::query::QueryEngine;
use crate::rdf::{NamespaceStore, ProjectionSettings};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only state of the endpoints
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn QueryEngine>,
    pub namespaces: Arc<dyn NamespaceStore>,
    pub settings: Arc<ProjectionSettings>,
    pub stream: StreamConfig,
}

impl AppState {
    /// State over an engine that also keeps the namespace definitions
    pub fn new<E>(engine: Arc<E>, config: &EndpointConfig) -> Self
    where
        E: QueryEngine + NamespaceStore + 'static,
    {
        Self {
            engine: engine.clone(),
            namespaces: engine,
            settings: Arc::new(config.projection_settings()),
            stream: config.stream,
        }
    }

    /// Read namespace definitions from a separate metadata store
    pub fn with_namespace_store(mut self, store: Arc<dyn NamespaceStore>) -> Self {
        self.namespaces = store;
        self
    }
}

/// Build the endpoint router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/cypher", post(cypher_handler))
        .route("/cypheronrdf", post(cypher_on_rdf_handler))
        .route("/describe/id", get(describe_by_id_handler))
        .route("/describe/uri", get(describe_by_uri_handler))
        .route("/export", post(export_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server for the RDF endpoints
pub struct HttpServer {
    state: AppState,
    address: String,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(state: AppState, address: impl Into<String>) -> Self {
        Self {
            state,
            address: address.into(),
        }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> std::io::Result<()> {
        let app = router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(&self.address).await?;

        info!("RDF endpoint listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app).await
    }
}
