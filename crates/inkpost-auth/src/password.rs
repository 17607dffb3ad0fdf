//! PBKDF2 password credentials
//!
//! A stored credential is `<salt>:<hash>`, both lowercase hex. The salt is
//! 16 random bytes; the hash is 64 bytes of PBKDF2-HMAC-SHA512 over the
//! password, keyed with the hex salt text.

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

use crate::error::AuthError;

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA512;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;
/// Random salt length in bytes
pub const SALT_LEN: usize = 16;
/// Derived key length in bytes
pub const KEY_LEN: usize = 64;

const SEPARATOR: char = ':';

/// Well-formed credential that no password matches in practice.
///
/// Verified against when a login names an unknown user so both failure
/// paths spend the same derivation time.
pub const DUMMY_CREDENTIAL: &str = concat!(
    "00000000000000000000000000000000",
    ":",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000"
);

/// Password hasher with a fixed iteration count
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Create a hasher; zero iterations is raised to one
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Derive a storable credential from a password with a fresh salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let mut salt = [0u8; SALT_LEN];
        SystemRandom::new()
            .fill(&mut salt)
            .map_err(|_| AuthError::PasswordHash("failed to generate salt".to_string()))?;
        let salt = hex::encode(salt);

        let mut key = [0u8; KEY_LEN];
        pbkdf2::derive(
            PBKDF2_ALG,
            self.iterations,
            salt.as_bytes(),
            password.as_bytes(),
            &mut key,
        );

        Ok(format!("{}{}{}", salt, SEPARATOR, hex::encode(key)))
    }

    /// Check a password against a stored credential
    ///
    /// Malformed credentials never match.
    pub fn verify(&self, password: &str, credential: &str) -> bool {
        let Some((salt, key)) = credential.split_once(SEPARATOR) else {
            return false;
        };
        let Ok(expected) = hex::decode(key) else {
            return false;
        };
        if expected.len() != KEY_LEN {
            return false;
        }

        pbkdf2::verify(
            PBKDF2_ALG,
            self.iterations,
            salt.as_bytes(),
            password.as_bytes(),
            &expected,
        )
        .is_ok()
    }
}

/// Hash a password with the default parameters
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    PasswordHasher::default().hash(password)
}

/// Verify a password with the default parameters
pub fn verify_password(password: &str, credential: &str) -> bool {
    PasswordHasher::default().verify(password, credential)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1_000)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let credential = hasher.hash("demo123456").unwrap();

        assert!(hasher.verify("demo123456", &credential));
        assert!(!hasher.verify("demo1234567", &credential));
        assert!(!hasher.verify("", &credential));
    }

    #[test]
    fn test_credential_format() {
        let credential = hasher().hash("password").unwrap();
        let (salt, key) = credential.split_once(':').unwrap();

        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(key.len(), KEY_LEN * 2);
        assert!(credential.chars().all(|c| c == ':' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salts_are_unique() {
        let hasher = hasher();
        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same-password", &first));
        assert!(hasher.verify("same-password", &second));
    }

    #[test]
    fn test_iterations_are_part_of_the_derivation() {
        let credential = PasswordHasher::new(1_000).hash("password").unwrap();
        assert!(!PasswordHasher::new(1_001).verify("password", &credential));
    }

    #[test]
    fn test_malformed_credentials_fail() {
        let hasher = hasher();
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "no-separator"));
        assert!(!hasher.verify("password", "abcd:not-hex"));
        assert!(!hasher.verify("password", "abcd:abcd"));
        assert!(!hasher.verify("password", DUMMY_CREDENTIAL));
    }

    #[test]
    fn test_default_parameters() {
        let credential = hash_password("demo123456").unwrap();
        assert!(verify_password("demo123456", &credential));
        assert!(!verify_password("demo12345", &credential));
    }

    #[test]
    fn test_zero_iterations_clamped() {
        assert_eq!(PasswordHasher::new(0).iterations(), 1);
        assert_eq!(PasswordHasher::default().iterations(), DEFAULT_ITERATIONS);
    }
}
