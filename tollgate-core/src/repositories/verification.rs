use crate::{
    Error,
    verification::{NewVerificationCode, VerificationCode},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for email verification codes
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync + 'static {
    /// Store a new code
    async fn create(&self, code: NewVerificationCode) -> Result<VerificationCode, Error>;

    /// The most recently created row for this (email, code) pair
    async fn find_latest(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<VerificationCode>, Error>;

    /// Mark a code used if it is still unused and unexpired at `now`.
    ///
    /// Must be a single conditional write: returns `true` only for the one
    /// caller whose write flipped the flag.
    async fn mark_used(&self, id: i64, now: DateTime<Utc>) -> Result<bool, Error>;

    /// Delete expired codes for one email
    async fn delete_expired_for_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, Error>;

    /// Delete expired codes for every email
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, Error>;
}
