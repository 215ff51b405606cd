//! Axum route handlers for role resolution.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resolution::ResolvedMatch;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub text: Option<String>,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub matches: Vec<ResolvedMatch>,
}

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub roles: Vec<String>,
}

/// GET /api/v1/roles
pub async fn handle_list_roles(State(state): State<AppState>) -> Json<RoleListResponse> {
    Json(RoleListResponse {
        roles: state.resolver.catalog().sorted(),
    })
}

/// POST /api/v1/roles/resolve
///
/// Missing or blank text returns no matches rather than an error.
pub async fn handle_resolve(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<ResolveResponse>, AppError> {
    let Json(request) = payload?;
    let k = request.k.unwrap_or(state.config.default_top_k);
    if k == 0 || k > state.config.max_top_k {
        return Err(AppError::Validation(format!(
            "k must be between 1 and {}",
            state.config.max_top_k
        )));
    }

    let text = request.text.unwrap_or_default();
    let matches = state.resolver.resolve(&text, k).await?;

    Ok(Json(ResolveResponse { matches }))
}
