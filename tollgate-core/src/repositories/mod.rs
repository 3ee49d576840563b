//! Repository traits for data access layer
//!
//! Together these traits are the credential store: every read and write the
//! auth services perform goes through them, and nothing else touches storage.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] combines all provider traits plus lifecycle methods
//!
//! Services are generic over single repositories; the `*RepositoryAdapter`
//! types in [`adapter`] project one repository out of a shared provider.

pub mod adapter;
pub mod oauth;
pub mod password;
pub mod session;
pub mod user;
pub mod verification;

pub use adapter::{
    OAuthRepositoryAdapter, PasswordRepositoryAdapter, SessionRepositoryAdapter,
    UserRepositoryAdapter, VerificationCodeRepositoryAdapter,
};
pub use oauth::OAuthRepository;
pub use password::PasswordRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
pub use verification::VerificationCodeRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for session repository access.
pub trait SessionRepositoryProvider: Send + Sync + 'static {
    type SessionRepo: SessionRepository;

    fn session(&self) -> &Self::SessionRepo;
}

/// Provider trait for password repository access.
pub trait PasswordRepositoryProvider: Send + Sync + 'static {
    type PasswordRepo: PasswordRepository;

    fn password(&self) -> &Self::PasswordRepo;
}

/// Provider trait for verification code repository access.
pub trait VerificationCodeRepositoryProvider: Send + Sync + 'static {
    type VerificationCodeRepo: VerificationCodeRepository;

    fn verification_code(&self) -> &Self::VerificationCodeRepo;
}

/// Provider trait for federated login state access.
pub trait OAuthRepositoryProvider: Send + Sync + 'static {
    type OAuthRepo: OAuthRepository;

    fn oauth(&self) -> &Self::OAuthRepo;
}

/// Provider trait that storage implementations must implement to provide all repositories.
///
/// # Implementing a Custom Storage Backend
///
/// 1. Implement each individual `*Repository` trait for your backend
/// 2. Implement each individual `*RepositoryProvider` trait
/// 3. Implement this trait with `migrate()` and `health_check()`
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider
    + SessionRepositoryProvider
    + PasswordRepositoryProvider
    + VerificationCodeRepositoryProvider
    + OAuthRepositoryProvider
{
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Cheap round-trip to the backing store
    async fn health_check(&self) -> Result<(), Error>;
}
