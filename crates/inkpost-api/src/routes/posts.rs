//! Post routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use inkpost_db::{DbError, NewPost, Post, PostDetails, PostUpdate};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireSession;
use super::types::{CreatePostRequest, SuccessResponse, UpdatePostRequest};

// ==================== Input Validation ====================

/// Maximum length for a post title
const MAX_TITLE_LENGTH: usize = 200;
/// Maximum length for a slug
const MAX_SLUG_LENGTH: usize = 200;

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Slugs are lowercase ASCII words joined by single hyphens
pub(super) fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Slug must be between 1 and {} characters",
            MAX_SLUG_LENGTH
        )));
    }
    let well_formed = slug
        .split('-')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    if !well_formed {
        return Err(ApiError::BadRequest(
            "Slug may only contain lowercase letters, digits and single hyphens".to_string(),
        ));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::BadRequest("Content is required".to_string()));
    }
    Ok(())
}

fn slug_taken(e: DbError) -> ApiError {
    match e {
        DbError::Duplicate(_) => ApiError::BadRequest("A post with this slug already exists".to_string()),
        DbError::InvalidReference(_) => ApiError::BadRequest("Unknown category".to_string()),
        other => other.into(),
    }
}

// ==================== Ownership ====================

/// Load a post the caller is about to modify
///
/// 404 when the post does not exist, 403 when it belongs to someone else.
async fn owned_post(state: &AppState, id: i64, user_id: &str, action: &str) -> Result<Post, ApiError> {
    let post = state
        .db
        .get_post_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if !post.is_owned_by(user_id) {
        warn!(
            "User {} tried to {} post {} owned by {}",
            user_id, action, id, post.author_id
        );
        return Err(ApiError::Forbidden(format!("You can only {} your own posts", action)));
    }

    Ok(post)
}

// ==================== Post Routes ====================

/// GET /api/posts
async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostDetails>>, ApiError> {
    let posts = state.db.list_published_posts().await?;
    Ok(Json(state.db.get_posts_details(posts).await?))
}

/// GET /api/posts/mine
async fn list_my_posts(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<Vec<PostDetails>>, ApiError> {
    let posts = state.db.list_posts_by_author(&user.id).await?;
    Ok(Json(state.db.get_posts_details(posts).await?))
}

/// GET /api/posts/slug/{slug}
///
/// Drafts are only visible to their author.
async fn get_post_by_slug(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Result<Json<PostDetails>, ApiError> {
    let not_found = || ApiError::NotFound("Post not found".to_string());

    let post = state.db.get_post_by_slug(&slug).await?.ok_or_else(not_found)?;

    if !post.published {
        let viewer = state.guard.authenticate(&jar).ok();
        if !viewer.is_some_and(|u| post.is_owned_by(&u.id)) {
            debug!("Hiding draft post {} from non-author", post.id);
            return Err(not_found());
        }
    }

    Ok(Json(state.db.get_post_details(post).await?))
}

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostDetails>), ApiError> {
    let Json(request) = payload?;
    validate_title(&request.title)?;
    validate_slug(&request.slug)?;
    validate_content(&request.content)?;

    let post = state
        .db
        .insert_post(NewPost {
            title: request.title,
            slug: request.slug,
            content: request.content,
            excerpt: request.excerpt,
            author_id: user.id,
            category_ids: request.category_ids.unwrap_or_default(),
        })
        .await
        .map_err(slug_taken)?;

    info!("Created post {} ({})", post.id, post.slug);

    Ok((StatusCode::CREATED, Json(state.db.get_post_details(post).await?)))
}

/// PUT /api/posts/{id}
async fn update_post(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostDetails>, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    if let Some(ref title) = request.title {
        validate_title(title)?;
    }
    if let Some(ref slug) = request.slug {
        validate_slug(slug)?;
    }
    if let Some(ref content) = request.content {
        validate_content(content)?;
    }

    owned_post(&state, id, &user.id, "update").await?;

    let post = state
        .db
        .update_post(
            id,
            PostUpdate {
                title: request.title,
                slug: request.slug,
                content: request.content,
                excerpt: request.excerpt,
                category_ids: request.category_ids,
            },
        )
        .await
        .map_err(slug_taken)?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    info!("Updated post {}", id);

    Ok(Json(state.db.get_post_details(post).await?))
}

/// DELETE /api/posts/{id}
async fn delete_post(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = path?;
    owned_post(&state, id, &user.id, "delete").await?;

    if !state.db.delete_post(id).await? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    info!("Deleted post {}", id);
    Ok(Json(SuccessResponse::ok()))
}

async fn set_published(
    state: AppState,
    user_id: &str,
    id: i64,
    published: bool,
) -> Result<Json<PostDetails>, ApiError> {
    let action = if published { "publish" } else { "unpublish" };
    owned_post(&state, id, user_id, action).await?;

    let post = state
        .db
        .set_post_published(id, published)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    info!("Post {} {}ed", id, action);

    Ok(Json(state.db.get_post_details(post).await?))
}

/// POST /api/posts/{id}/publish
async fn publish_post(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostDetails>, ApiError> {
    let Path(id) = path?;
    set_published(state, &user.id, id, true).await
}

/// POST /api/posts/{id}/unpublish
async fn unpublish_post(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostDetails>, ApiError> {
    let Path(id) = path?;
    set_published(state, &user.id, id, false).await
}

/// Create post routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/mine", get(list_my_posts))
        .route("/api/posts/slug/{slug}", get(get_post_by_slug))
        .route("/api/posts/{id}", put(update_post).delete(delete_post))
        .route("/api/posts/{id}/publish", post(publish_post))
        .route("/api/posts/{id}/unpublish", post(unpublish_post))
}
