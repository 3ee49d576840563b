//! Core functionality for tollgate
//!
//! This crate holds the domain types ([`User`], [`Session`],
//! [`VerificationCode`]), the error taxonomy, the repository traits that make
//! up the credential store, and the services that implement registration,
//! verification, login and session handling on top of them.
//!
//! Application code normally goes through the `tollgate` crate, which wires
//! these services to a concrete [`RepositoryProvider`]. Storage backends
//! depend on this crate to implement the repository traits.
//!
//! External collaborators are reached through two traits:
//! [`VerificationMailer`] for delivering codes and [`IdentityProvider`] for
//! federated login.
pub mod crypto;
pub mod error;
pub mod identity;
pub mod repositories;
pub mod services;
pub mod session;
pub mod user;
pub mod validation;
pub mod verification;

pub use error::Error;
pub use identity::{AuthorizationRequest, ExternalIdentity, IdentityProvider};
pub use repositories::RepositoryProvider;
pub use services::{
    OAuthService, PasswordService, SessionService, UserService, VerificationMailer,
    VerificationService,
};
pub use session::{Session, SessionToken};
pub use user::{AccountOrigin, NewUser, PublicUser, User, UserId};
pub use verification::{NewVerificationCode, VerificationCode, VerificationOutcome};
