//! Inkpost REST API
//!
//! This crate provides the Axum-based HTTP API for Inkpost: session
//! endpoints, posts and categories, the author dashboard and health checks.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
