//! Session lifecycle integration tests

mod common;

use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};
use inkpost_api::create_router;
use inkpost_auth::SessionUser;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use common::{
    DEMO_EMAIL, DEMO_PASSWORD, TestApp, body_json, json_request, request, session_cookie,
    set_cookie_header,
};

#[tokio::test]
async fn test_login_sets_cookie_and_returns_identity() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie_header(&response).unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"));

    let token = session_cookie(&response).unwrap();
    let claims = app.state.jwt.validate_token(&token).unwrap();
    assert_eq!(claims.email, DEMO_EMAIL);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], DEMO_EMAIL);
    assert_eq!(body["user"]["name"], "Demo User");
    assert_eq!(body["user"]["id"], claims.user_id);
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_wrong_password_is_rejected_without_cookie() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": DEMO_EMAIL, "password": "wrong-password" }),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": DEMO_PASSWORD }),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_malformed_body_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request("POST", "/api/auth/login", json!({ "email": DEMO_EMAIL }), None))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_register_creates_account_and_session() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            json!({ "email": "new@example.com", "name": "New Writer", "password": "longenough" }),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let token = session_cookie(&response).unwrap();
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "new@example.com");
    assert_eq!(body["user"]["name"], "New Writer");

    // The stored credential works for a fresh login
    let login_token = app.login("new@example.com", "longenough").await;
    assert!(!login_token.is_empty());

    let me = app.send(request("GET", "/api/auth/me", Some(&token))).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["email"], "new@example.com");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            json!({ "email": DEMO_EMAIL, "name": "Someone", "password": "longenough" }),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await["error"], "Email already registered");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;

    let cases = [
        json!({ "email": "a@example.com", "name": "Writer", "password": "short" }),
        json!({ "email": "a@example.com", "name": "W", "password": "longenough" }),
        json!({ "email": "not-an-email", "name": "Writer", "password": "longenough" }),
    ];

    for body in cases {
        let response = app
            .send(json_request("POST", "/api/auth/register", body, None))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    assert!(app.state.db.get_user_by_email("a@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    let token = app.login(DEMO_EMAIL, DEMO_PASSWORD).await;

    let response = app.send(request("POST", "/api/auth/logout", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie_header(&response).unwrap();
    assert!(cookie.starts_with("auth-token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_logout_without_session_still_succeeds() {
    let app = TestApp::new().await;

    let response = app.send(request("POST", "/api/auth/logout", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie_header(&response).is_some());
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new().await;

    let response = app.send(request("GET", "/api/auth/me", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Unauthorized");

    let response = app.send(request("GET", "/api/auth/me", Some("garbage"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_for_vanished_user() {
    let app = TestApp::new().await;
    let token = app
        .state
        .jwt
        .generate_token(&SessionUser {
            id: "user-gone".to_string(),
            email: "gone@example.com".to_string(),
            name: "Gone".to_string(),
        })
        .unwrap();

    let response = app.send(request("GET", "/api/auth/me", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "User not found");
}

#[tokio::test]
async fn test_dashboard_without_cookie_redirects_to_login() {
    let app = TestApp::new().await;

    let response = app.send(request("GET", "/dashboard", None)).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login?from=%2Fdashboard");
}

#[tokio::test]
async fn test_dashboard_with_expired_cookie_redirects_to_login() {
    let app = TestApp::new().await;
    let user = app.session_user(DEMO_EMAIL).await;
    let token = app
        .state
        .jwt
        .generate_token_at(&user, Utc::now() - Duration::days(8))
        .unwrap();

    let response = app.send(request("GET", "/dashboard/posts", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login?from=%2Fdashboard%2Fposts"
    );
}

#[tokio::test]
async fn test_dashboard_with_session() {
    let app = TestApp::new().await;
    let token = app.login(DEMO_EMAIL, DEMO_PASSWORD).await;

    let created = app
        .send(json_request(
            "POST",
            "/api/posts",
            json!({ "title": "Draft", "slug": "draft", "content": "one two three" }),
            Some(&token),
        ))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let response = app.send(request("GET", "/dashboard", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], DEMO_EMAIL);
    assert_eq!(body["total_posts"], 1);
    assert_eq!(body["published_posts"], 0);
    assert_eq!(body["draft_posts"], 1);

    let response = app.send(request("GET", "/dashboard/posts", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_public_paths_skip_the_guard() {
    let app = TestApp::new().await;

    let response = app.send(request("GET", "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");

    let response = app.send(request("GET", "/api/posts", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint_renders_when_enabled() {
    let app = TestApp::new().await;
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let router = create_router(app.state.clone(), Some(Arc::new(handle)));

    let response = router.oneshot(request("GET", "/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Without a handle the route is not mounted
    let response = app.send(request("GET", "/metrics", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
