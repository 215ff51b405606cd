use std::sync::Arc;

use crate::config::Config;
use crate::pathfinding::PathFinder;
use crate::resolution::RoleResolver;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Resolver and path finder are built once at startup and never mutated,
/// so handlers read them concurrently without locking.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RoleResolver>,
    pub path_finder: Arc<PathFinder>,
    pub config: Config,
}
