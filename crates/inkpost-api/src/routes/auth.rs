//! Session extractor and authentication routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use inkpost_auth::{AuthError, SessionUser, password::DUMMY_CREDENTIAL};
use inkpost_db::{NewUser, UserSummary};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{AuthResponse, LoginRequest, RegisterRequest, SuccessResponse};

// ==================== Session Extractor ====================

/// Extractor for an authenticated session (required)
///
/// Reuses the user attached by the access guard when present, otherwise
/// verifies the session cookie itself. Rejects with 401.
pub struct RequireSession(pub SessionUser);

impl<S> FromRequestParts<S> for RequireSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<SessionUser>() {
            return Ok(RequireSession(user.clone()));
        }

        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let user = app_state
            .guard
            .authenticate(&jar)
            .map_err(|_| ApiError::not_authenticated())?;

        debug!("Authenticated session for {}", user.email);
        Ok(RequireSession(user))
    }
}

// ==================== Input Validation ====================

/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed password length (bounds the hashing cost)
const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed display name length
const MIN_NAME_LENGTH: usize = 2;
/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 255;

/// Validate email shape: `local@domain.tld`
fn validate_email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::BadRequest("Invalid email".to_string());

    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

fn validate_login(request: &LoginRequest) -> Result<(), ApiError> {
    validate_email(&request.email)?;
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn validate_registration(request: &RegisterRequest) -> Result<(), ApiError> {
    validate_email(&request.email)?;
    if request.name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Name must be at least {} characters",
            MIN_NAME_LENGTH
        )));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// Mint a token for the user and attach it to the cookie jar
fn start_session(state: &AppState, jar: CookieJar, user: &UserSummary) -> Result<CookieJar, ApiError> {
    let token = state.jwt.generate_token(&SessionUser {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
    })?;
    Ok(state.cookies.persist(jar, token))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;
    validate_login(&request)?;

    debug!("Login attempt for user: {}", request.email);

    let user = state.db.get_user_by_email(&request.email).await?;

    // Unknown users are checked against a dummy credential so both failure
    // paths cost one derivation
    let credential = user
        .as_ref()
        .map(|u| u.password.clone())
        .unwrap_or_else(|| DUMMY_CREDENTIAL.to_string());
    let password_valid = state.verify_password(request.password, credential).await?;

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            metrics::counter!("inkpost_logins_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let summary = UserSummary::from(&user);
    let jar = start_session(&state, jar, &summary)?;

    metrics::counter!("inkpost_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in successfully", user.email);

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: summary,
        }),
    ))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;
    validate_registration(&request)?;

    debug!("Registering user: {}", request.email);

    if state.db.get_user_by_email(&request.email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let password = state.hash_password(request.password).await?;

    let user = state
        .db
        .insert_user(NewUser {
            email: request.email,
            name: request.name.trim().to_string(),
            password,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration
            inkpost_db::DbError::Duplicate(_) => {
                ApiError::BadRequest("Email already registered".to_string())
            }
            other => other.into(),
        })?;

    let summary = UserSummary::from(&user);
    let jar = start_session(&state, jar, &summary)?;

    metrics::counter!("inkpost_registrations_total").increment(1);
    info!("Registered user: {}", user.email);

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            success: true,
            user: summary,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Only the client-held cookie is cleared; the token stays valid until it
/// expires.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    (state.cookies.clear(jar), Json(SuccessResponse::ok()))
}

/// GET /api/auth/me
async fn me(State(state): State<AppState>, jar: CookieJar) -> Result<Json<UserSummary>, ApiError> {
    let session = state
        .guard
        .authenticate(&jar)
        .map_err(|_| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let user = state
        .db
        .get_user_summary(&session.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}
