//! Authentication error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Covers bad signatures, malformed tokens and expiry alike
    #[error("Invalid token")]
    InvalidToken,

    #[error("Not authenticated")]
    MissingToken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}
