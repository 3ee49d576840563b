use crate::{Error, User, UserId, repositories::UserRepository};
use std::sync::Arc;

/// Default number of results returned by [`UserService::search_users`]
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;
/// Upper bound on results returned by [`UserService::search_users`]
pub const MAX_SEARCH_LIMIT: u32 = 20;

/// Service for user lookups
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.repository.find_by_email(email).await
    }

    /// Flip the verified flag for the account owning `email`
    pub async fn mark_email_verified(&self, email: &str) -> Result<(), Error> {
        self.repository.mark_email_verified(email).await
    }

    /// Search users by name or email
    ///
    /// `limit` defaults to 5 and is clamped to `1..=20`. A blank query
    /// matches nothing rather than everything.
    pub async fn search_users(&self, query: &str, limit: Option<u32>) -> Result<Vec<User>, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT);
        self.repository.search(query, limit).await
    }
}
