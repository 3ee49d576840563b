//! Email delivery for tollgate
//!
//! The only message tollgate sends is the six-digit verification code.
//! [`CodeMailer`] renders it with askama and hands it to one of the
//! transports: SMTP for production, `.eml` files for development, or an
//! in-memory outbox for tests.
pub mod code_mailer;
pub mod config;
pub mod email;
pub mod error;
pub mod mailer;
pub mod templates;
pub mod transports;

pub use code_mailer::CodeMailer;
pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use error::MailerError;
pub use mailer::Mailer;
pub use transports::{FileTransport, MemoryTransport, SmtpTransport};

pub mod prelude {
    pub use crate::{
        CodeMailer, Email, EmailBuilder, FileTransport, Mailer, MailerConfig, MailerError,
        MemoryTransport, SmtpTransport,
    };
}
