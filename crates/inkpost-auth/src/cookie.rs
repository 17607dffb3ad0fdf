//! Session cookie handling
//!
//! The session token travels in a single HttpOnly cookie. This module owns
//! its name and attributes; handlers only hand tokens in and out.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Cookie name for the session token
pub const AUTH_COOKIE_NAME: &str = "auth-token";

/// Default cookie lifetime, mirroring the token lifetime (7 days)
pub const DEFAULT_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Writes, reads and clears the session cookie
#[derive(Debug, Clone)]
pub struct SessionCookies {
    /// Whether to set the Secure flag (production only)
    secure: bool,
    max_age: time::Duration,
}

impl SessionCookies {
    pub fn new(secure: bool, max_age_secs: i64) -> Self {
        Self {
            secure,
            max_age: time::Duration::seconds(max_age_secs),
        }
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Build the cookie carrying a session token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE_NAME, token))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(self.max_age)
            .path("/")
            .build()
    }

    /// Store a session token in the jar
    pub fn persist(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.session_cookie(token))
    }

    /// Read the session token, if any, from the request cookies
    pub fn retrieve(jar: &CookieJar) -> Option<String> {
        jar.get(AUTH_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|token| !token.is_empty())
    }

    /// Expire the session cookie on the client
    ///
    /// The removal cookie is always emitted, even when the request carried
    /// no session. The token itself stays valid until it expires.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = Cookie::build((AUTH_COOKIE_NAME, ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .build();
        cookie.make_removal();
        jar.add(cookie)
    }
}

impl Default for SessionCookies {
    fn default() -> Self {
        Self::new(false, DEFAULT_MAX_AGE_SECS)
    }
}
