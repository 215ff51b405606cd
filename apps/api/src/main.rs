mod artifacts;
mod config;
mod errors;
mod models;
mod pathfinding;
mod resolution;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::pathfinding::PathFinder;
use crate::resolution::{Embedder, OllamaEmbedder, RoleResolver, TokenHashEmbedder};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting WannaBe API v{}", env!("CARGO_PKG_VERSION"));

    let embedder = build_embedder(&config)?;
    info!("Embedding backend: {}", embedder.name());

    let resolver = build_resolver(&config, embedder).await?;
    // A catalog/index mismatch makes every vector lookup meaningless; refuse to serve.
    resolver
        .verify()
        .context("Role catalog and embedding index are inconsistent")?;

    let graph = artifacts::load_graph(&config.transition_graph_path)
        .context("Failed to load transition graph")?;

    let missing = graph.missing_roles(resolver.catalog().roles());
    if !missing.is_empty() {
        warn!(
            "{} of {} catalog roles are not transition graph nodes (e.g. {:?})",
            missing.len(),
            resolver.catalog().len(),
            &missing[..missing.len().min(5)]
        );
    }
    let path_finder = PathFinder::new(graph);

    let state = AppState {
        resolver: Arc::new(resolver),
        path_finder: Arc::new(path_finder),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.embedding_backend {
        EmbeddingBackend::Ollama => Arc::new(
            OllamaEmbedder::new(
                &config.ollama_host,
                &config.embedding_model,
                Duration::from_secs(config.embedding_timeout_secs),
            )
            .context("Failed to build embedding HTTP client")?,
        ),
        EmbeddingBackend::TokenHash => Arc::new(TokenHashEmbedder::default()),
    };
    Ok(embedder)
}

/// Loads the catalog and either the precomputed embeddings or, when none are
/// configured, embeds the catalog with the active backend.
async fn build_resolver(config: &Config, embedder: Arc<dyn Embedder>) -> Result<RoleResolver> {
    let catalog = artifacts::load_catalog(&config.role_catalog_path)
        .context("Failed to load role catalog")?;

    match &config.role_embeddings_path {
        Some(path) => {
            let index =
                artifacts::load_embeddings(path).context("Failed to load role embeddings")?;
            Ok(RoleResolver::new(catalog, index, embedder))
        }
        None => {
            info!(
                "ROLE_EMBEDDINGS_PATH not set; embedding {} catalog roles at startup",
                catalog.len()
            );
            RoleResolver::with_embedded_catalog(catalog, embedder)
                .await
                .context("Failed to embed role catalog")
        }
    }
}
