use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("File transport error: {0}")]
    File(#[from] lettre::transport::file::Error),

    #[error("Email address error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email message error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Email builder error: {0}")]
    Builder(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MailerError> for tollgate_core::Error {
    fn from(err: MailerError) -> Self {
        use tollgate_core::error::DeliveryError;

        match err {
            MailerError::Builder(_)
            | MailerError::Template(_)
            | MailerError::Address(_)
            | MailerError::Message(_)
            | MailerError::Config(_) => DeliveryError::Build(err.to_string()).into(),
            MailerError::Smtp(_) | MailerError::File(_) | MailerError::Io(_) => {
                DeliveryError::Send(err.to_string()).into()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MailerError>;
