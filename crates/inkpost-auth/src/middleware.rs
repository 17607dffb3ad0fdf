//! Access guard middleware for Axum

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::debug;

use crate::cookie::SessionCookies;
use crate::error::AuthError;
use crate::jwt::{JwtManager, SessionUser};

/// Default login page that unauthenticated browsers are sent to
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Request-time authentication policy for browser routes
#[derive(Clone)]
pub struct AccessGuard {
    jwt: Arc<JwtManager>,
    protected_prefixes: Arc<[String]>,
    login_path: Arc<str>,
}

impl AccessGuard {
    pub fn new(jwt: Arc<JwtManager>, protected_prefixes: Vec<String>, login_path: &str) -> Self {
        Self {
            jwt,
            protected_prefixes: protected_prefixes.into(),
            login_path: login_path.into(),
        }
    }

    /// Whether a path falls under one of the protected prefixes
    ///
    /// Prefixes match whole path segments: `/dashboard` covers
    /// `/dashboard` and `/dashboard/posts` but not `/dashboards`.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Login URL carrying the original path as a `from` hint
    pub fn login_redirect(&self, from: &str) -> String {
        let from: String = url::form_urlencoded::byte_serialize(from.as_bytes()).collect();
        format!("{}?from={}", self.login_path, from)
    }

    /// Resolve the session carried by the request cookies
    pub fn authenticate(&self, jar: &CookieJar) -> Result<SessionUser, AuthError> {
        let token = SessionCookies::retrieve(jar).ok_or(AuthError::MissingToken)?;
        let claims = self.jwt.validate_token(&token)?;
        Ok(SessionUser::from_claims(&claims))
    }
}

/// Access guard middleware
///
/// Public paths pass through untouched. Protected paths need a valid
/// session cookie; the decoded [`SessionUser`] is added to the request
/// extensions. Anything else is redirected to the login page.
pub async fn access_guard(
    State(guard): State<AccessGuard>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if !guard.is_protected(&path) {
        return next.run(request).await;
    }

    match guard.authenticate(&jar) {
        Ok(user) => {
            debug!("Access granted to {} for {}", path, user.email);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!("Access to {} denied: {}", path, e);
            metrics::counter!("inkpost_guard_redirects_total").increment(1);
            Redirect::temporary(&guard.login_redirect(&path)).into_response()
        }
    }
}
