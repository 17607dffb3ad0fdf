//! Session token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Authenticated user carried by a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl SessionUser {
    /// Create from token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.user_id.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
        }
    }
}

/// JWT manager for token generation and validation
///
/// Owns the signing secret; tokens are HS256 and expire a fixed time after
/// issuance.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    /// Session lifetime
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Generate a session token for a user
    pub fn generate_token(&self, user: &SessionUser) -> Result<String, AuthError> {
        self.generate_token_at(user, Utc::now())
    }

    /// Generate a session token as if issued at `issued_at`
    pub fn generate_token_at(
        &self,
        user: &SessionUser,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = issued_at + self.token_ttl;

        let claims = Claims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        debug!("Generating token for user: {}", user.email);

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Validate a session token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now().timestamp())
    }

    /// Validate a session token against the given clock (Unix seconds)
    ///
    /// Every failure is reported as [`AuthError::InvalidToken`]. A token is
    /// already invalid at the instant `exp` is reached.
    pub fn validate_token_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Rejected session token: {}", e);
            AuthError::InvalidToken
        })?;

        if token_data.claims.exp <= now {
            debug!("Rejected expired session token");
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}
