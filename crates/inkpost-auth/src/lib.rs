//! Inkpost Authentication
//!
//! This crate provides the session core for Inkpost: PBKDF2 password
//! credentials, signed session tokens, the `auth-token` cookie, and the
//! access guard that protects browser routes.

pub mod cookie;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use cookie::{AUTH_COOKIE_NAME, SessionCookies};
pub use error::AuthError;
pub use jwt::{Claims, JwtManager, SessionUser};
pub use middleware::{AccessGuard, access_guard};
pub use password::{PasswordHasher, hash_password, verify_password};
