//! Password value object - Domain layer password handling.
//!
//! Hashes with Argon2. Stored values come in two formats: proper Argon2
//! hashes and a transitional legacy format where the database still holds
//! the plaintext. Verification resolves the format explicitly so callers
//! can re-hash legacy accounts on their first successful login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Outcome of verifying a plaintext candidate against a stored password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordMatch {
    /// Argon2 hash matched
    Verified,
    /// Legacy plaintext matched; the account should be re-hashed
    VerifiedLegacy,
    /// No match
    Rejected,
}

impl PasswordMatch {
    pub fn is_match(self) -> bool {
        matches!(self, PasswordMatch::Verified | PasswordMatch::VerifiedLegacy)
    }
}

/// Tagged stored-password format.
enum StoredFormat<'a> {
    Hashed(&'a str),
    LegacyPlaintext(&'a str),
}

impl<'a> StoredFormat<'a> {
    fn parse(stored: &'a str) -> Self {
        // Anything that parses as a PHC string is treated as hashed;
        // everything else is the transitional plaintext format.
        if PasswordHash::new(stored).is_ok() {
            StoredFormat::Hashed(stored)
        } else {
            StoredFormat::LegacyPlaintext(stored)
        }
    }
}

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    stored: String,
}

// Don't expose the stored value in debug output (it may be legacy plaintext)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("stored", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a validation error if the password is too short.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.len() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let stored = Self::hash(plain_text)?;
        Ok(Self { stored })
    }

    /// Wrap a stored value from the database (hash or legacy plaintext).
    pub fn from_stored(stored: String) -> Self {
        Self { stored }
    }

    /// Get the stored string for persistence.
    pub fn as_str(&self) -> &str {
        &self.stored
    }

    /// Consume and return the stored string.
    pub fn into_string(self) -> String {
        self.stored
    }

    /// Whether the stored value is still in the legacy plaintext format.
    pub fn is_legacy(&self) -> bool {
        matches!(StoredFormat::parse(&self.stored), StoredFormat::LegacyPlaintext(_))
    }

    /// Verify a plaintext candidate, resolving the stored format.
    pub fn verify(&self, plain_text: &str) -> PasswordMatch {
        match StoredFormat::parse(&self.stored) {
            StoredFormat::Hashed(hash) => {
                if Self::verify_hash(plain_text, hash) {
                    PasswordMatch::Verified
                } else {
                    PasswordMatch::Rejected
                }
            }
            StoredFormat::LegacyPlaintext(stored) => {
                if plain_text == stored {
                    PasswordMatch::VerifiedLegacy
                } else {
                    PasswordMatch::Rejected
                }
            }
        }
    }

    /// Hash a password using Argon2.
    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify password against an Argon2 hash.
    fn verify_hash(plain_text: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plain_text.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.stored
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.stored == other.stored
    }
}

impl Eq for Password {}
