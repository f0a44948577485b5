//! Streaming RDF response bodies
//!
//! Projection runs on a blocking thread: it pulls rows from the query engine,
//! writes triples through the serializer into a [`ChannelWriter`], and the
//! writer hands fixed-size chunks to the connection over a bounded channel.
//! A full channel blocks the projection, so a slow client slows the query
//! down instead of the response piling up in memory.
//!
//! Preparation (namespace loading, opening the read transaction, starting the
//! query) finishes before the response head is sent, so those failures become
//! ordinary JSON error responses. A failure after that point ends the chunked
//! body with an error rather than a clean end-of-stream.

use super::error::EndpointError;
use super::server::AppState;
use crate::query::{GraphQuery, ResultStream};
use crate::rdf::{
    export_statements, IdentityStrategy, NamespaceRegistry, ProjectionError, ProjectionResult,
    ProjectionStats, RdfFormat, RdfSerializer, RequestContext, TripleProjector,
};
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use bytes::{Bytes, BytesMut};
use std::io::{self, Write};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

type Chunk = io::Result<Bytes>;

/// `io::Write` adapter feeding a response body channel.
///
/// Must only be used from a blocking context.
pub struct ChannelWriter {
    tx: mpsc::Sender<Chunk>,
    buf: BytesMut,
    chunk_size: usize,
}

impl ChannelWriter {
    pub fn new(tx: mpsc::Sender<Chunk>, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            tx,
            buf: BytesMut::with_capacity(chunk_size),
            chunk_size,
        }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = self.buf.split().freeze();
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= self.chunk_size {
            self.send_buffered()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

/// What to do with the rows of a query
pub enum ProjectionMode {
    /// Project nodes and relationships through an identity strategy
    Graph(Box<dyn IdentityStrategy>),
    /// Rows of `subject`, `predicate`, `object` columns
    Statements,
}

/// One streamed RDF request
pub struct RdfRequest {
    pub query: GraphQuery,
    pub mode: ProjectionMode,
    pub format: RdfFormat,
}

/// Run `request` and answer with a streamed RDF body
pub async fn stream_rdf(state: AppState, request: RdfRequest) -> Result<Response, EndpointError> {
    let format = request.format;
    let (tx, rx) = mpsc::channel::<Chunk>(state.stream.channel_capacity.max(1));
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::task::spawn_blocking(move || produce(state, request, tx, ready_tx));

    match ready_rx.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            return Err(EndpointError::Internal(
                "projection task ended before streaming".to_string(),
            ))
        }
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.content_type())
        .body(Body::from_stream(ReceiverStream::new(rx)))
        .map_err(|e| EndpointError::Internal(e.to_string()))
}

/// Load namespaces, open the read transaction and start the query
fn prepare(state: &AppState, query: &GraphQuery) -> Result<(RequestContext, ResultStream), EndpointError> {
    let namespaces = NamespaceRegistry::load(state.namespaces.as_ref())?;
    let ctx = RequestContext::new(state.settings.clone(), namespaces);
    let rows = ResultStream::open(state.engine.as_ref(), query)?;
    Ok((ctx, rows))
}

fn produce(
    state: AppState,
    request: RdfRequest,
    tx: mpsc::Sender<Chunk>,
    ready: oneshot::Sender<Result<(), EndpointError>>,
) {
    let (ctx, rows) = match prepare(&state, &request.query) {
        Ok(prepared) => prepared,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if ready.send(Ok(())).is_err() {
        debug!("Client went away before streaming started");
        return;
    }

    let writer = ChannelWriter::new(tx.clone(), state.stream.chunk_size);
    match project(request.mode, request.format, ctx, rows, writer) {
        Ok(stats) => {
            debug!(
                format = %request.format,
                rows = stats.rows,
                triples = stats.triples,
                "RDF response complete"
            );
        }
        Err(ProjectionError::Serialize(e)) if e.is_disconnect() => {
            info!(format = %request.format, "Client disconnected, projection stopped");
        }
        Err(e) => {
            warn!(format = %request.format, "RDF stream aborted: {}", e);
            let _ = tx.blocking_send(Err(io::Error::new(io::ErrorKind::Other, e.to_string())));
        }
    }
}

/// Drive the rows through the serializer. On failure the serializer is
/// dropped, which finishes the document on a best-effort basis.
fn project(
    mode: ProjectionMode,
    format: RdfFormat,
    ctx: RequestContext,
    rows: ResultStream,
    writer: ChannelWriter,
) -> ProjectionResult<ProjectionStats> {
    let prefixes = match &mode {
        ProjectionMode::Graph(strategy) => strategy.declared_prefixes(&ctx),
        ProjectionMode::Statements => Vec::new(),
    };
    let mut serializer = RdfSerializer::open(format, writer, &prefixes)?;
    let result = match &mode {
        ProjectionMode::Graph(strategy) => {
            TripleProjector::new(strategy.as_ref(), ctx).project(rows, &mut serializer)
        }
        ProjectionMode::Statements => {
            export_statements(rows, &ctx.settings().export_base, &mut serializer)
        }
    };
    match result {
        Ok(stats) => {
            serializer.close()?;
            Ok(stats)
        }
        Err(e) => {
            drop(serializer);
            Err(e)
        }
    }
}
