//! Request/Response DTOs

use inkpost_auth::SessionUser;
use inkpost_db::UserSummary;
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Login/register response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserSummary,
}

/// Generic acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ==================== Post Types ====================

/// Create post request
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category_ids: Option<Vec<i64>>,
}

/// Partial post update request
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_ids: Option<Vec<i64>>,
}

// ==================== Category Types ====================

/// Create or update category request
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ==================== Dashboard Types ====================

/// Author dashboard overview
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub user: SessionUser,
    pub total_posts: usize,
    pub published_posts: usize,
    pub draft_posts: usize,
}
