use crate::{Error, NewUser, User, UserId};
use async_trait::async_trait;

/// Repository for user data access
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user. Fails with a constraint error if the email or
    /// external identity is already taken.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find a user by email, matching exactly
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Find a federated user by the provider's subject identifier
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, Error>;

    /// Set the verified flag for the account owning `email`
    async fn mark_email_verified(&self, email: &str) -> Result<(), Error>;

    /// Case-insensitive substring search over name and email
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<User>, Error>;
}
