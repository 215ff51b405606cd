pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::pathfinding::handlers as path_handlers;
use crate::resolution::handlers as role_handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Role resolution
        .route("/api/v1/roles", get(role_handlers::handle_list_roles))
        .route("/api/v1/roles/resolve", post(role_handlers::handle_resolve))
        // Path search
        .route("/api/v1/paths", post(path_handlers::handle_find_path))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Config, EmbeddingBackend};
    use crate::pathfinding::{GraphBuilder, PathFinder};
    use crate::resolution::{RoleCatalog, RoleResolver, TokenHashEmbedder};

    fn test_config() -> Config {
        Config {
            role_catalog_path: PathBuf::from("catalog.json"),
            transition_graph_path: PathBuf::from("graph.json"),
            role_embeddings_path: None,
            embedding_backend: EmbeddingBackend::TokenHash,
            ollama_host: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_timeout_secs: 5,
            default_top_k: 3,
            max_top_k: 10,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    async fn test_app() -> Router {
        let catalog = RoleCatalog::new(["Data Analyst", "Data Engineer", "ML Engineer"]).unwrap();
        let resolver =
            RoleResolver::with_embedded_catalog(catalog, Arc::new(TokenHashEmbedder::default()))
                .await
                .unwrap();

        let mut graph = GraphBuilder::new();
        graph
            .add_edge("data analyst", "data engineer", 0.6, 40, 0.51)
            .unwrap();
        graph
            .add_edge("data engineer", "ml engineer", 0.4, 15, 0.92)
            .unwrap();
        graph.add_node("hermit").unwrap();

        build_router(AppState {
            resolver: Arc::new(resolver),
            path_finder: Arc::new(PathFinder::new(graph.build())),
            config: test_config(),
        })
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_reports_artifact_sizes() {
        let (status, body) = send(test_app().await, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["roles"], 3);
        assert_eq!(body["graph_nodes"], 4);
        assert_eq!(body["graph_edges"], 2);
    }

    #[tokio::test]
    async fn test_list_roles_sorted() {
        let (status, body) = send(test_app().await, "GET", "/api/v1/roles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["roles"],
            json!(["data analyst", "data engineer", "ml engineer"])
        );
    }

    #[tokio::test]
    async fn test_resolve_exact_match() {
        let (status, body) = send(
            test_app().await,
            "POST",
            "/api/v1/roles/resolve",
            Some(json!({ "text": "  ML Engineer " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches"], json!([{ "role": "ml engineer", "score": 1.0 }]));
    }

    #[tokio::test]
    async fn test_resolve_uses_default_k() {
        let (_, body) = send(
            test_app().await,
            "POST",
            "/api/v1/roles/resolve",
            Some(json!({ "text": "senior data engineer" })),
        )
        .await;
        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0]["role"], "data engineer");
    }

    #[tokio::test]
    async fn test_resolve_missing_text_is_empty() {
        let (status, body) =
            send(test_app().await, "POST", "/api/v1/roles/resolve", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches"], json!([]));
    }

    #[tokio::test]
    async fn test_resolve_rejects_out_of_range_k() {
        for k in [0, 11] {
            let (status, body) = send(
                test_app().await,
                "POST",
                "/api/v1/roles/resolve",
                Some(json!({ "text": "analyst", "k": k })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_find_path_success_body() {
        let (status, body) = send(
            test_app().await,
            "POST",
            "/api/v1/paths",
            Some(json!({ "current_role": "Data Analyst", "target_role": "ml engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["path"],
            json!(["data analyst", "data engineer", "ml engineer"])
        );
        assert_eq!(body["steps"][0]["count"], 40);
        let confidence = body["total_confidence"].as_f64().unwrap();
        assert!((confidence - 0.24).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_find_path_accepts_camel_case_fields() {
        let (_, body) = send(
            test_app().await,
            "POST",
            "/api/v1/paths",
            Some(json!({ "currentRole": "data analyst", "targetRole": "data engineer" })),
        )
        .await;
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_find_path_failures_are_structured() {
        let (status, body) = send(
            test_app().await,
            "POST",
            "/api/v1/paths",
            Some(json!({ "current_role": "data analyst", "target_role": "hermit" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["reason"], "no_path_exists");

        let (_, body) = send(
            test_app().await,
            "POST",
            "/api/v1/paths",
            Some(json!({ "current_role": "astronaut", "target_role": "hermit" })),
        )
        .await;
        assert_eq!(body["reason"], "node_not_found");
        assert!(body["error"].as_str().unwrap().contains("current"));
    }

    #[tokio::test]
    async fn test_find_path_missing_field_is_validation_error() {
        let (status, body) = send(
            test_app().await,
            "POST",
            "/api/v1/paths",
            Some(json!({ "target_role": "data engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("current_role"));
    }

    #[tokio::test]
    async fn test_resolve_non_numeric_k_is_validation_error() {
        let (status, body) = send(
            test_app().await,
            "POST",
            "/api/v1/roles/resolve",
            Some(json!({ "text": "analyst", "k": "three" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, body) = send(test_app().await, "GET", "/api/v1/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
