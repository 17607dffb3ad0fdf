//! Shared helpers for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use inkpost_api::{AppState, create_router};
use inkpost_auth::{AccessGuard, JwtManager, PasswordHasher, SessionCookies, SessionUser};
use inkpost_db::{Database, NewUser, UserSummary};
use serde_json::Value;
use tower::ServiceExt;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo123456";
pub const TEST_EMAIL: &str = "test@example.com";
pub const TEST_PASSWORD: &str = "test123456";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// App over a fresh in-memory database with the two demo accounts
    pub async fn new() -> Self {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let jwt = Arc::new(JwtManager::new("integration-secret", Duration::days(7)));
        let passwords = PasswordHasher::new(1_000);
        let guard = AccessGuard::new(jwt.clone(), vec!["/dashboard".to_string()], "/auth/login");
        let state = AppState::new(db, jwt, passwords, SessionCookies::default(), guard);

        for (email, name, password) in [
            (DEMO_EMAIL, "Demo User", DEMO_PASSWORD),
            (TEST_EMAIL, "Test User", TEST_PASSWORD),
        ] {
            state
                .db
                .insert_user(NewUser {
                    email: email.to_string(),
                    name: name.to_string(),
                    password: passwords.hash(password).unwrap(),
                })
                .await
                .unwrap();
        }

        let router = create_router(state.clone(), None);
        Self { router, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Log in and return the session cookie value
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                serde_json::json!({ "email": email, "password": password }),
                None,
            ))
            .await;
        session_cookie(&response).expect("login should set the session cookie")
    }

    pub async fn user(&self, email: &str) -> UserSummary {
        let user = self.state.db.get_user_by_email(email).await.unwrap().unwrap();
        UserSummary::from(&user)
    }

    pub async fn session_user(&self, email: &str) -> SessionUser {
        let user = self.user(email).await;
        SessionUser {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("auth-token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("auth-token={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Raw `Set-Cookie` header for the session cookie, if any
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("auth-token="))
        .map(str::to_string)
}

/// Session token carried by the response's `Set-Cookie`, if non-empty
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let header = set_cookie_header(response)?;
    let value = header
        .trim_start_matches("auth-token=")
        .split(';')
        .next()
        .unwrap_or_default();
    (!value.is_empty()).then(|| value.to_string())
}
