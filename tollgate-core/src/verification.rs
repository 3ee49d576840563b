//! Email verification codes
//!
//! A code is six decimal digits bound to one email address. Any number of
//! codes may be outstanding for an address; each can be consumed once and
//! only before it expires.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Smallest code that can be issued.
pub const CODE_MIN: u32 = 100_000;
/// Largest code that can be issued.
pub const CODE_MAX: u32 = 999_999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    pub id: i64,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// A code about to be written to storage.
#[derive(Debug, Clone)]
pub struct NewVerificationCode {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of checking a presented code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The code matched, was unused and unexpired, and has now been consumed.
    Valid,
    /// The code was already consumed, possibly by a concurrent request.
    Invalid,
    /// The code matched but its expiry has passed.
    Expired,
    /// No code matches the email and code pair.
    NotFound,
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationOutcome::Valid)
    }
}

/// Source of human-facing verification codes.
///
/// Owns one generator seeded from OS entropy at construction. The codes are
/// not secrets on their own (they also need the mailbox), so a fast
/// non-cryptographic generator is enough; it is never reseeded per call.
pub struct CodeGenerator {
    rng: Mutex<StdRng>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic generator for tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// A uniformly distributed code in `[100000, 999999]`.
    pub fn generate(&self) -> String {
        // A panic while holding the lock cannot leave the RNG in a bad state.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(CODE_MIN..=CODE_MAX).to_string()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generated_codes_are_six_digits_in_range() {
        let generator = CodeGenerator::new();
        for _ in 0..1000 {
            let code = generator.generate();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value));
        }
    }

    #[test]
    fn test_rapid_calls_are_not_correlated() {
        let generator = CodeGenerator::new();
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generator.generate()).collect();
        // 50 draws from 900k values; collisions would point at reseeding.
        assert!(codes.len() >= 48);
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let a = CodeGenerator::from_seed(7);
        let b = CodeGenerator::from_seed(7);
        assert_eq!(a.generate(), b.generate());
    }

    #[test]
    fn test_is_expired_at() {
        let now = Utc::now();
        let code = VerificationCode {
            id: 1,
            email: "a@x.com".to_string(),
            code: "123456".to_string(),
            expires_at: now,
            used: false,
            created_at: now - Duration::minutes(10),
        };
        assert!(!code.is_expired_at(now));
        assert!(code.is_expired_at(now + Duration::seconds(1)));
    }
}
