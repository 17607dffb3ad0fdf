//! Author dashboard routes
//!
//! These live under the guarded `/dashboard` prefix, so unauthenticated
//! requests never reach the handlers.

use axum::{Json, Router, extract::State, routing::get};
use inkpost_db::PostDetails;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::DashboardResponse;

/// GET /dashboard
async fn overview(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<DashboardResponse>, ApiError> {
    let posts = state.db.list_posts_by_author(&user.id).await?;
    let published_posts = posts.iter().filter(|p| p.published).count();

    Ok(Json(DashboardResponse {
        total_posts: posts.len(),
        published_posts,
        draft_posts: posts.len() - published_posts,
        user,
    }))
}

/// GET /dashboard/posts
async fn posts(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<Vec<PostDetails>>, ApiError> {
    let posts = state.db.list_posts_by_author(&user.id).await?;
    Ok(Json(state.db.get_posts_details(posts).await?))
}

/// Create dashboard routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(overview))
        .route("/dashboard/posts", get(posts))
}
