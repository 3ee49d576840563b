//! Repository implementations for SQLite storage
//!
//! Timestamps are stored as unix seconds in `INTEGER` columns.

pub mod oauth;
pub mod password;
pub mod session;
pub mod user;
pub mod verification;

pub use oauth::SqliteOAuthRepository;
pub use password::SqlitePasswordRepository;
pub use session::SqliteSessionRepository;
pub use user::SqliteUserRepository;
pub use verification::SqliteVerificationCodeRepository;

use chrono::{DateTime, Utc};
use tollgate_core::{Error, error::StorageError};

/// Map a sqlx error, keeping unique violations distinguishable
pub(crate) fn storage_error(err: sqlx::Error) -> Error {
    let is_unique_violation = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());

    if is_unique_violation {
        Error::Storage(StorageError::Constraint(err.to_string()))
    } else {
        Error::Storage(StorageError::Database(err.to_string()))
    }
}

pub(crate) fn from_timestamp(seconds: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        Error::Storage(StorageError::Database(format!(
            "Invalid timestamp: {seconds}"
        )))
    })
}
