//! Federated login providers for tollgate
//!
//! Each provider implements [`tollgate_core::IdentityProvider`]: it builds
//! an authorization URL with a CSRF state and a PKCE challenge, and later
//! exchanges the returned code for a verified [`tollgate_core::ExternalIdentity`].
//! Storing the state between those two steps is the caller's job.
//!
//! Provider settings live in an [`OAuthConfig`] built once at startup.
pub mod config;
pub mod google;

pub use config::OAuthConfig;
pub use google::Google;
