//! Application state

use inkpost_auth::{AccessGuard, JwtManager, PasswordHasher, SessionCookies};
use inkpost_db::Database;
use std::sync::Arc;

use crate::error::ApiError;

/// Prometheus handle rendering the `/metrics` endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub passwords: PasswordHasher,
    pub cookies: SessionCookies,
    pub guard: AccessGuard,
}

impl AppState {
    pub fn new(
        db: Database,
        jwt: Arc<JwtManager>,
        passwords: PasswordHasher,
        cookies: SessionCookies,
        guard: AccessGuard,
    ) -> Self {
        Self {
            db,
            jwt,
            passwords,
            cookies,
            guard,
        }
    }

    /// Hash a password off the async executor
    pub async fn hash_password(&self, password: String) -> Result<String, ApiError> {
        let hasher = self.passwords;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))?
            .map_err(ApiError::from)
    }

    /// Verify a password off the async executor
    pub async fn verify_password(&self, password: String, credential: String) -> Result<bool, ApiError> {
        let hasher = self.passwords;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &credential))
            .await
            .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))
    }
}
