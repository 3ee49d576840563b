//! Cryptographic utilities for session tokens
//!
//! Session tokens are 32 bytes drawn from the operating system CSPRNG and
//! handed to clients as 64 lowercase hex characters. Storage only ever sees
//! the SHA256 hash of a token, so a leaked sessions table cannot be replayed.
//!
//! Lookups hash the presented token and match the stored hash exactly; the
//! repository then re-checks the hash with a constant-time comparison.

use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Number of random bytes in a session token.
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Generate a new session token.
///
/// Returns 64 hex characters encoding 256 bits from [`OsRng`]. Every call
/// goes through the same process-wide OS entropy source; nothing is seeded
/// per call.
pub fn generate_session_token() -> Result<String, CryptoError> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Random(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Hash a token for storage using SHA256, hex-encoded.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a token against a stored hash with constant-time comparison.
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(computed_hash.as_bytes(), stored_hash.as_bytes())
}

/// Constant-time comparison of two byte slices.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_is_64_hex_chars() {
        let token = generate_session_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_session_tokens_differ() {
        let a = generate_session_token().unwrap();
        let b = generate_session_token().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_and_verify_token() {
        let token = "test_token_12345";
        let hash = hash_token(token);

        assert!(verify_token_hash(token, &hash));
        assert!(!verify_token_hash("wrong_token", &hash));
        assert_eq!(hash, hash_token(token));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"short", b"longer_string"));
    }
}
