//! Email verification codes
//!
//! Issues six-digit codes bound to an email address and checks them. The
//! check-and-consume step relies on [`VerificationCodeRepository::mark_used`]
//! being a single conditional write, so two concurrent checks of the same
//! code cannot both succeed.

use crate::{
    Error,
    repositories::VerificationCodeRepository,
    verification::{CodeGenerator, NewVerificationCode, VerificationCode, VerificationOutcome},
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Default lifetime of a verification code (10 minutes)
pub const DEFAULT_CODE_EXPIRATION: Duration = Duration::minutes(10);

/// Service for issuing and checking email verification codes
pub struct VerificationService<V: VerificationCodeRepository> {
    repository: Arc<V>,
    generator: CodeGenerator,
    expires_in: Duration,
}

impl<V: VerificationCodeRepository> VerificationService<V> {
    /// Create a new VerificationService with the given repository
    pub fn new(repository: Arc<V>) -> Self {
        Self {
            repository,
            generator: CodeGenerator::new(),
            expires_in: DEFAULT_CODE_EXPIRATION,
        }
    }

    /// Replace the code generator, e.g. with a seeded one in tests
    pub fn with_generator(mut self, generator: CodeGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_expiration(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Generate a code without storing it
    pub fn generate(&self) -> String {
        self.generator.generate()
    }

    /// Issue and store a new code for `email`
    ///
    /// Earlier outstanding codes for the same address stay valid.
    pub async fn issue(&self, email: &str) -> Result<VerificationCode, Error> {
        self.issue_with_expiration(email, self.expires_in).await
    }

    pub async fn issue_with_expiration(
        &self,
        email: &str,
        expires_in: Duration,
    ) -> Result<VerificationCode, Error> {
        let code = NewVerificationCode {
            email: email.to_string(),
            code: self.generate(),
            expires_at: Utc::now() + expires_in,
        };

        self.repository.create(code).await
    }

    /// Check a presented code, consuming it when valid
    pub async fn verify(&self, email: &str, code: &str) -> Result<VerificationOutcome, Error> {
        let Some(stored) = self.repository.find_latest(email, code).await? else {
            return Ok(VerificationOutcome::NotFound);
        };

        if stored.used {
            return Ok(VerificationOutcome::Invalid);
        }

        let now = Utc::now();
        if stored.is_expired_at(now) {
            return Ok(VerificationOutcome::Expired);
        }

        if self.repository.mark_used(stored.id, now).await? {
            Ok(VerificationOutcome::Valid)
        } else {
            // Another request consumed it between the read and the write.
            Ok(VerificationOutcome::Invalid)
        }
    }

    /// Delete expired codes for one email
    pub async fn cleanup(&self, email: &str) -> Result<u64, Error> {
        self.repository
            .delete_expired_for_email(email, Utc::now())
            .await
    }

    /// Delete expired codes for every email
    pub async fn cleanup_all_expired(&self) -> Result<u64, Error> {
        self.repository.delete_expired(Utc::now()).await
    }
}
