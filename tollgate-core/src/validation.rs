//! Request field validation shared by the auth services.
//!
//! Messages produced here are safe to show to end users; the HTTP layer
//! returns them verbatim in 400 responses.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Practical subset of RFC 5322, compiled once.
///
/// `None` only if the pattern fails to compile; every address is then
/// rejected rather than accepted unchecked.
static EMAIL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok()
});

/// Validates the three registration fields together.
///
/// Missing fields are reported as one combined message before any format
/// checks run.
///
/// ```rust
/// use tollgate_core::validation::validate_registration;
///
/// assert!(validate_registration("a@x.com", "secret1", "Ann").is_ok());
/// assert!(validate_registration("a@x.com", "", "Ann").is_err());
/// assert!(validate_registration("a@x.com", "short", "Ann").is_err());
/// ```
pub fn validate_registration(email: &str, password: &str, name: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
        return Err(ValidationError::MissingField(
            "Email, password, and name are required".to_string(),
        ));
    }

    validate_password(password)?;
    validate_email(email)?;
    validate_name(name)
}

/// Validates an email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    let Some(pattern) = EMAIL_REGEX.as_ref() else {
        tracing::error!("Email pattern failed to compile");
        return Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )));
    };

    if pattern.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

/// Validates a password for local registration.
///
/// Only length is enforced: at least [`MIN_PASSWORD_LENGTH`] characters and
/// no more than 128.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if length > 128 {
        return Err(ValidationError::InvalidPassword(
            "Password must be no more than 128 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a display name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(
            "Name cannot be empty or whitespace only".to_string(),
        ));
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::InvalidName(
            "Name must be no more than 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates the fields of an email verification request.
pub fn validate_verification(email: &str, code: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || code.trim().is_empty() {
        return Err(ValidationError::MissingField(
            "Email and code are required".to_string(),
        ));
    }
    Ok(())
}

/// Validates an identity provider name taken from a request path.
pub fn validate_provider(provider: &str) -> Result<(), ValidationError> {
    if provider.is_empty() || provider.len() > 50 {
        return Err(ValidationError::InvalidField(
            "Identity provider name must be 1 to 50 characters".to_string(),
        ));
    }

    if !provider
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidField(
            "Identity provider name must contain only lowercase letters, numbers, and hyphens"
                .to_string(),
        ));
    }

    Ok(())
}
