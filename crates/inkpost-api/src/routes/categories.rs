//! Category routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    routing::get,
};
use inkpost_db::{Category, DbError, NewCategory, PostDetails};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::posts::validate_slug;
use super::types::{CategoryRequest, SuccessResponse};

/// Maximum length for a category name
const MAX_NAME_LENGTH: usize = 64;

fn validate_category(request: &CategoryRequest) -> Result<(), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    validate_slug(&request.slug)
}

fn category_taken(e: DbError) -> ApiError {
    match e {
        DbError::Duplicate(_) => {
            ApiError::BadRequest("A category with this name or slug already exists".to_string())
        }
        other => other.into(),
    }
}

impl From<CategoryRequest> for NewCategory {
    fn from(request: CategoryRequest) -> Self {
        NewCategory {
            name: request.name.trim().to_string(),
            slug: request.slug,
            description: request.description,
        }
    }
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.list_categories().await?))
}

/// GET /api/categories/{slug}
async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, ApiError> {
    state
        .db
        .get_category_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
}

/// GET /api/categories/{slug}/posts
///
/// An unknown slug yields an empty list.
async fn list_category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<PostDetails>>, ApiError> {
    let Some(category) = state.db.get_category_by_slug(&slug).await? else {
        return Ok(Json(Vec::new()));
    };

    let posts = state.db.list_published_posts_in_category(category.id).await?;
    Ok(Json(state.db.get_posts_details(posts).await?))
}

/// POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(request) = payload?;
    validate_category(&request)?;

    let category = state
        .db
        .insert_category(request.into())
        .await
        .map_err(category_taken)?;

    info!("User {} created category {}", user.email, category.slug);
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
async fn update_category(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    validate_category(&request)?;

    let category = state
        .db
        .update_category(id, request.into())
        .await
        .map_err(category_taken)?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    info!("User {} updated category {}", user.email, id);
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = path?;
    if !state.db.delete_category(id).await? {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    info!("User {} deleted category {}", user.email, id);
    Ok(Json(SuccessResponse::ok()))
}

/// Create category routes
///
/// Reads address categories by slug, writes by numeric id; both share the
/// same path segment.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{key}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/api/categories/{key}/posts", get(list_category_posts))
}
