//! Refresh-token secrets.
//!
//! A refresh secret is 48 bytes from the OS CSPRNG, base64url-encoded for the
//! client. Only its Argon2id PHC hash is stored server-side, so a database leak
//! does not hand out live sessions. Verification goes through Argon2's own
//! verifier, which compares in constant time.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Params};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::TryRngCore;

use crate::types::Timestamp;

/// Bytes of entropy in every refresh secret.
pub const SECRET_BYTES: usize = 48;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("random source unavailable: {0}")]
    RandomSource(String),

    #[error("failed to hash refresh secret: {0}")]
    Hashing(String),

    #[error("refresh secret does not match")]
    Mismatch,

    #[error("refresh session expired")]
    Expired,
}

/// A freshly minted secret and the hash to persist for it.
pub struct GeneratedSecret {
    /// Handed to the client exactly once, never stored or logged.
    pub secret: String,
    /// Argon2id PHC string.
    pub hash: String,
}

/// Generates, hashes and verifies refresh secrets.
#[derive(Clone, Default)]
pub struct RefreshSecretManager {
    argon2: Argon2<'static>,
}

impl RefreshSecretManager {
    /// Argon2id with the crate's default cost parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    pub fn generate(&self) -> Result<GeneratedSecret, SecretError> {
        let mut raw = [0u8; SECRET_BYTES];
        rand::rngs::OsRng
            .try_fill_bytes(&mut raw)
            .map_err(|e| SecretError::RandomSource(e.to_string()))?;

        let secret = URL_SAFE_NO_PAD.encode(raw);
        let hash = self.hash(&secret)?;

        Ok(GeneratedSecret { secret, hash })
    }

    fn hash(&self, secret: &str) -> Result<String, SecretError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SecretError::Hashing(e.to_string()))
    }

    /// Check `secret` against a stored hash.
    ///
    /// An unparseable stored hash counts as a mismatch.
    pub fn verify(&self, secret: &str, hash: &str) -> Result<(), SecretError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            tracing::warn!(error = %e, "Stored refresh hash is not a valid PHC string");
            SecretError::Mismatch
        })?;

        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .map_err(|_| SecretError::Mismatch)
    }

    pub fn check_expiry(&self, expires_at: Timestamp) -> Result<(), SecretError> {
        if Utc::now() > expires_at {
            return Err(SecretError::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn fast_manager() -> RefreshSecretManager {
    // Minimal cost so the test suite does not spend its time in Argon2.
    RefreshSecretManager::with_params(Params::new(1024, 1, 1, None).expect("valid params"))
}
