use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and the sizes of the loaded artifacts.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let graph = state.path_finder.graph();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "wannabe-api",
        "roles": state.resolver.catalog().len(),
        "embedding_dimension": state.resolver.index().dimension(),
        "graph_nodes": graph.node_count(),
        "graph_edges": graph.edge_count(),
        "embedder": state.resolver.embedder_name(),
    }))
}
