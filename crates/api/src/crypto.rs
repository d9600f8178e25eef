//! Cryptographic helpers for authentication.
//!
//! - PBKDF2-SHA256 password hashing (iteration count stored per user)
//! - Random session tokens, stored server-side as SHA-256 digests

use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};

use crate::ServiceError;

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TOKEN_LEN: usize = 32;

// ── Password hashing ────────────────────────────────────────────────────────

/// Stored password material, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
    pub iterations: u32,
}

/// Hash a password with PBKDF2-SHA256 and a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> Result<PasswordHash, ServiceError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    Ok(PasswordHash {
        hash: hex::encode(hash),
        salt: hex::encode(salt),
        iterations,
    })
}

/// Verify a password against stored material.
pub fn verify_password(password: &str, stored: &PasswordHash) -> bool {
    let Ok(salt) = hex::decode(&stored.salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(&stored.hash) else {
        return false;
    };
    if stored.iterations == 0 {
        return false;
    }

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, stored.iterations, &mut hash);

    constant_time_eq(&hash, &expected)
}

/// Stand-in material for accounts without a password. Verifying against it
/// costs the same PBKDF2 work as a real check and never succeeds.
pub fn decoy_password_hash(iterations: u32) -> PasswordHash {
    PasswordHash {
        hash: "00".repeat(HASH_LEN),
        salt: "a5".repeat(SALT_LEN),
        iterations: iterations.max(1),
    }
}

// ── Tokens ──────────────────────────────────────────────────────────────────

/// Generate a secure random session token. Returns hex-encoded.
pub fn generate_token() -> Result<String, ServiceError> {
    let mut bytes = [0u8; TOKEN_LEN];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;
    Ok(hex::encode(bytes))
}

/// Hash a token with SHA-256 for storage. Returns hex-encoded.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
