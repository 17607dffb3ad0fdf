//! API routes

mod auth;
mod categories;
mod dashboard;
mod health;
mod posts;
pub mod types;

use axum::{Router, extract::State, middleware, response::IntoResponse, routing::get};
use inkpost_auth::access_guard;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

pub use auth::RequireSession;

/// GET /metrics - Prometheus metrics endpoint
async fn get_metrics(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Create the main router
///
/// The access guard wraps every route; only the configured protected
/// prefixes are gated by it.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let guard = state.guard.clone();

    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Session endpoints
        .merge(auth::routes())
        // Content API
        .merge(posts::routes())
        .merge(categories::routes())
        // Author dashboard (guarded)
        .merge(dashboard::routes())
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(get_metrics))
                .with_state(handle),
        );
    }

    router.layer(middleware::from_fn_with_state(guard, access_guard))
}
