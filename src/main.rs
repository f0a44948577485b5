use anyhow::Context;
use clap::Parser;
use samyama_rdf_endpoint::{AppState, EndpointConfig, GraphStore, HttpServer, MemoryEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Serve property graph query results as RDF
#[derive(Parser)]
#[command(name = "samyama-rdf-endpoint", version, about)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "SAMYAMA_RDF_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the configuration)
    #[arg(long)]
    port: Option<u16>,

    /// JSON graph fixture to serve (overrides the configuration)
    #[arg(long)]
    graph: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EndpointConfig::from_file(path)
            .with_context(|| format!("loading configuration {:?}", path))?,
        None => EndpointConfig::default(),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(graph) = args.graph {
        config.graph.fixture = Some(graph);
    }

    let store = match &config.graph.fixture {
        Some(path) => GraphStore::load_fixture(path)
            .with_context(|| format!("loading graph fixture {:?}", path))?,
        None => {
            info!("No graph fixture configured, serving an empty graph");
            GraphStore::new()
        }
    };

    info!("Samyama RDF Endpoint v{}", samyama_rdf_endpoint::version());

    let engine = Arc::new(MemoryEngine::new(store));
    let state = AppState::new(engine, &config);
    HttpServer::new(state, config.bind_address())
        .start()
        .await
        .context("HTTP server failed")
}
