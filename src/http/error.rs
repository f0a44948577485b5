//! Endpoint errors and their HTTP rendering

use crate::query::QueryError;
use crate::rdf::{NamespaceError, ProjectionError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors reported to the client before any body byte is sent
#[derive(Error, Debug)]
pub enum EndpointError {
    /// Malformed request parameters or body
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EndpointError {
    pub fn status(&self) -> StatusCode {
        match self {
            EndpointError::BadRequest(_) => StatusCode::BAD_REQUEST,
            EndpointError::Namespace(_) => StatusCode::SERVICE_UNAVAILABLE,
            EndpointError::Query(e) => query_status(e),
            EndpointError::Projection(ProjectionError::Query(e)) => query_status(e),
            EndpointError::Projection(_) | EndpointError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn query_status(error: &QueryError) -> StatusCode {
    match error {
        QueryError::Syntax(_) | QueryError::Unsupported(_) | QueryError::MissingParameter(_) => {
            StatusCode::BAD_REQUEST
        }
        QueryError::Transaction(_) | QueryError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::MetadataError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            EndpointError::BadRequest("nodeid".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EndpointError::from(NamespaceError::from(MetadataError::Unavailable("down".to_string()))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            EndpointError::from(QueryError::Syntax("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EndpointError::from(QueryError::Transaction("x".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
