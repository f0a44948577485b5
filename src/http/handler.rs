//! HTTP handlers for the RDF endpoints

use super::error::EndpointError;
use super::server::AppState;
use super::stream::{stream_rdf, ProjectionMode, RdfRequest};
use crate::graph::NodeId;
use crate::query::GraphQuery;
use crate::rdf::{PreservedUri, RdfFormat, SyntheticId};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// Query parameters of `GET /describe/id`
#[derive(Debug, Deserialize)]
pub struct DescribeByIdParams {
    pub nodeid: Option<String>,
    #[serde(rename = "excludeContext")]
    pub exclude_context: Option<String>,
}

/// Query parameters of `GET /describe/uri`
#[derive(Debug, Deserialize)]
pub struct DescribeByUriParams {
    pub nodeuri: Option<String>,
    #[serde(rename = "excludeContext")]
    pub exclude_context: Option<String>,
}

/// Liveness check
pub async fn ping_handler() -> impl IntoResponse {
    Json(json!({ "ping": "here!" }))
}

/// `POST /cypher`: arbitrary query, numeric-id identity
pub async fn cypher_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, EndpointError> {
    let request = RdfRequest {
        query: GraphQuery::cypher(query_text(&body)?),
        mode: ProjectionMode::Graph(Box::new(SyntheticId)),
        format: negotiate(&headers),
    };
    stream_rdf(state, request).await
}

/// `POST /cypheronrdf`: arbitrary query over an imported RDF graph
pub async fn cypher_on_rdf_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, EndpointError> {
    let request = RdfRequest {
        query: GraphQuery::cypher(query_text(&body)?),
        mode: ProjectionMode::Graph(Box::new(PreservedUri)),
        format: negotiate(&headers),
    };
    stream_rdf(state, request).await
}

/// `GET /describe/id?nodeid=…`: one node and its one-hop neighbourhood
pub async fn describe_by_id_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DescribeByIdParams>,
) -> Result<Response, EndpointError> {
    let raw = params
        .nodeid
        .ok_or_else(|| EndpointError::BadRequest("missing parameter `nodeid`".to_string()))?;
    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| EndpointError::BadRequest(format!("`nodeid` is not a node id: {}", raw)))?;
    let request = RdfRequest {
        query: GraphQuery::describe_by_id(NodeId::new(id), include_context(&params.exclude_context)),
        mode: ProjectionMode::Graph(Box::new(SyntheticId)),
        format: negotiate(&headers),
    };
    stream_rdf(state, request).await
}

/// `GET /describe/uri?nodeuri=…`: one imported resource and its neighbours
pub async fn describe_by_uri_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DescribeByUriParams>,
) -> Result<Response, EndpointError> {
    let uri = params
        .nodeuri
        .filter(|uri| !uri.is_empty())
        .ok_or_else(|| EndpointError::BadRequest("missing parameter `nodeuri`".to_string()))?;
    let request = RdfRequest {
        query: GraphQuery::describe_by_uri(uri, include_context(&params.exclude_context)),
        mode: ProjectionMode::Graph(Box::new(PreservedUri)),
        format: negotiate(&headers),
    };
    stream_rdf(state, request).await
}

/// `POST /export`: rows of `subject`, `predicate`, `object` as statements
pub async fn export_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, EndpointError> {
    let request = RdfRequest {
        query: GraphQuery::cypher(query_text(&body)?),
        mode: ProjectionMode::Statements,
        format: negotiate(&headers),
    };
    stream_rdf(state, request).await
}

fn negotiate(headers: &HeaderMap) -> RdfFormat {
    RdfFormat::negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()))
}

/// `excludeContext` switches the one-hop expansion off when present, unless
/// it is explicitly `false`
fn include_context(exclude: &Option<String>) -> bool {
    match exclude.as_deref() {
        None => true,
        Some(value) => value.eq_ignore_ascii_case("false"),
    }
}

/// Query text of a request body, without one pair of enclosing quotes
fn query_text(body: &str) -> Result<String, EndpointError> {
    let text = unquote(body.trim()).trim();
    if text.is_empty() {
        return Err(EndpointError::BadRequest("empty query".to_string()));
    }
    Ok(text.to_string())
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
