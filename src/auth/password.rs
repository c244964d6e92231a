//! Password and refresh-token fingerprint hashing
//!
//! One-way bcrypt hashing with fail-closed verification. The same primitives
//! cover stored passwords and stored refresh-token fingerprints; the two
//! uses never share hash outputs.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// bcrypt silently truncates input beyond this many bytes.
const BCRYPT_INPUT_LIMIT: usize = 72;

/// Hashing errors
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed")]
    HashingFailed,
}

/// Inputs longer than bcrypt's limit (JWTs used as refresh-token
/// fingerprints are well past it) are pre-digested with SHA-256 so the full
/// input participates in the hash. The rule depends only on input length,
/// so hash and verify always agree on it.
fn normalize(plain: &str) -> Vec<u8> {
    if plain.len() > BCRYPT_INPUT_LIMIT {
        let digest = Sha256::digest(plain.as_bytes());
        hex::encode(digest).into_bytes()
    } else {
        plain.as_bytes().to_vec()
    }
}

/// Hash a plaintext credential with bcrypt.
pub fn hash_sync(plain: &str) -> Result<String, PasswordError> {
    bcrypt::hash(normalize(plain), bcrypt::DEFAULT_COST).map_err(|_| PasswordError::HashingFailed)
}

/// Verify a plaintext credential against a stored bcrypt hash.
///
/// Fails closed: a malformed stored hash verifies as `false`, never as an
/// error. Callers must check the returned bool explicitly.
pub fn verify_sync(hashed: &str, plain: &str) -> bool {
    bcrypt::verify(normalize(plain), hashed).unwrap_or(false)
}

/// Async wrapper running the CPU-bound hash on the blocking pool.
pub async fn hash(plain: &str) -> Result<String, PasswordError> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_sync(&plain))
        .await
        .map_err(|_| PasswordError::HashingFailed)?
}

/// Async wrapper running the CPU-bound verify on the blocking pool.
pub async fn verify(hashed: &str, plain: &str) -> bool {
    let hashed = hashed.to_owned();
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || verify_sync(&hashed, &plain))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_round_trip() {
        let hashed = hash_sync("Str0ng!Pass").unwrap();
        assert!(verify_sync(&hashed, "Str0ng!Pass"));
        assert!(!verify_sync(&hashed, "Wr0ng!Pass"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_sync("same-input").unwrap();
        let b = hash_sync("same-input").unwrap();
        assert_ne!(a, b);
        assert!(verify_sync(&a, "same-input"));
        assert!(verify_sync(&b, "same-input"));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_sync("not-a-bcrypt-hash", "anything"));
        assert!(!verify_sync("", "anything"));
    }

    #[test]
    fn test_long_input_round_trip() {
        // Longer than the bcrypt limit, like a JWT refresh token.
        let long = "x".repeat(300);
        let hashed = hash_sync(&long).unwrap();
        assert!(verify_sync(&hashed, &long));

        // A different long input differing only past the truncation point
        // must not verify.
        let mut other = "x".repeat(299);
        other.push('y');
        assert!(!verify_sync(&hashed, &other));
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let hashed = hash("Str0ng!Pass").await.unwrap();
        assert!(verify(&hashed, "Str0ng!Pass").await);
        assert!(!verify(&hashed, "other").await);
    }
}
