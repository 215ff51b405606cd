//! Axum route handlers for career path search.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::pathfinding::{CareerPath, PathError, TransitionStep};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FindPathRequest {
    #[serde(alias = "currentRole")]
    pub current_role: String,
    #[serde(alias = "targetRole")]
    pub target_role: String,
}

/// Path search outcome. Failures are reported in the body, not as HTTP errors.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FindPathResponse {
    Found {
        success: bool,
        path: Vec<String>,
        steps: Vec<TransitionStep>,
        total_confidence: f64,
        total_cost: f64,
    },
    Failed {
        success: bool,
        reason: &'static str,
        error: String,
    },
}

impl From<Result<CareerPath, PathError>> for FindPathResponse {
    fn from(result: Result<CareerPath, PathError>) -> Self {
        match result {
            Ok(path) => FindPathResponse::Found {
                success: true,
                path: path.roles,
                steps: path.steps,
                total_confidence: path.confidence,
                total_cost: path.total_cost,
            },
            Err(err) => FindPathResponse::Failed {
                success: false,
                reason: err.reason(),
                error: err.to_string(),
            },
        }
    }
}

/// POST /api/v1/paths
///
/// A malformed body is a validation error; search failures are a 200 with `success: false`.
pub async fn handle_find_path(
    State(state): State<AppState>,
    payload: Result<Json<FindPathRequest>, JsonRejection>,
) -> Result<Json<FindPathResponse>, AppError> {
    let Json(request) = payload?;
    let result = state
        .path_finder
        .find_path(&request.current_role, &request.target_role);

    if let Err(err) = &result {
        info!("Path search failed ({}): {err}", err.reason());
    }

    Ok(Json(result.into()))
}
