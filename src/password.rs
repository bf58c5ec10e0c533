//! Password hashing and verification.
//!
//! Argon2id with a configurable time cost. The salt lives inside the PHC
//! hash string, and verification uses the crate's constant-time comparison.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, Version};

use crate::db::Principal;

/// Hasher configured once at startup. Invalid parameters are a fatal
/// configuration error, not something to recover from per-request.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with the given time cost (iterations).
    pub fn new(time_cost: u32) -> Result<Self, argon2::Error> {
        let params = Params::new(Params::DEFAULT_M_COST, time_cost, Params::DEFAULT_P_COST, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)?
            .to_string())
    }

    /// Check a plaintext password against a stored hash.
    /// A malformed stored hash verifies as false rather than erroring,
    /// so callers can treat every mismatch as invalid credentials.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                self.argon2
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Re-hash guard: update the record's hash only when a new plaintext was
    /// actually supplied. Saving a record without a password change leaves
    /// `password_hash` byte-identical. Returns whether the hash changed.
    pub fn apply_password_change(
        &self,
        principal: &mut Principal,
        new_plaintext: Option<&str>,
    ) -> Result<bool, argon2::password_hash::Error> {
        match new_plaintext {
            Some(plaintext) => {
                principal.password_hash = self.hash(plaintext)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
