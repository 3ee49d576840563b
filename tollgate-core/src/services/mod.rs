//! Service layer for business logic
//!
//! Each service is generic over the single repositories it needs, so it can
//! be driven by any storage backend or by an in-memory double in tests.

pub mod mailer;
pub mod oauth;
pub mod password;
pub mod session;
pub mod user;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;

pub use mailer::VerificationMailer;
pub use oauth::OAuthService;
pub use password::PasswordService;
pub use session::SessionService;
pub use user::UserService;
pub use verification::VerificationService;
