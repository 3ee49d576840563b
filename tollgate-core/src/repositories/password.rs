use crate::{Error, UserId};
use async_trait::async_trait;

/// Repository for password verifiers
///
/// Hashes are written together with the user row on registration, so only
/// the read side is exposed here.
#[async_trait]
pub trait PasswordRepository: Send + Sync + 'static {
    /// Retrieve a user's password hash; `None` for federated accounts
    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error>;
}
