use crate::templates::{VerificationCodeHtml, VerificationCodeText};
use crate::{Email, Mailer, MailerConfig, MailerError};
use askama::Template;
use async_trait::async_trait;
use tollgate_core::VerificationMailer;

/// Subject line of verification emails
pub const VERIFICATION_SUBJECT: &str = "Verify your email address";

/// Sends verification codes through a configured [`Mailer`]
pub struct CodeMailer {
    transport: Box<dyn Mailer>,
    config: MailerConfig,
    expires_in_minutes: i64,
}

impl CodeMailer {
    /// Build the transport described by `config`
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        let transport = config.build_transport()?;
        Ok(Self::with_transport(config, transport))
    }

    pub fn from_env() -> Result<Self, MailerError> {
        Self::new(MailerConfig::from_env()?)
    }

    /// Use an already constructed transport, ignoring `config.transport`
    pub fn with_transport(config: MailerConfig, transport: Box<dyn Mailer>) -> Self {
        Self {
            transport,
            config,
            expires_in_minutes: 10,
        }
    }

    /// Lifetime quoted in the email body; keep in step with the code lifetime
    pub fn with_expiry_minutes(mut self, minutes: i64) -> Self {
        self.expires_in_minutes = minutes;
        self
    }

    /// Render the verification email without sending it
    pub fn render(
        &self,
        to: &str,
        user_name: Option<&str>,
        code: &str,
    ) -> Result<Email, MailerError> {
        let html = VerificationCodeHtml {
            app_name: &self.config.app_name,
            user_name,
            code,
            expires_in_minutes: self.expires_in_minutes,
        }
        .render()?;
        let text = VerificationCodeText {
            app_name: &self.config.app_name,
            user_name,
            code,
            expires_in_minutes: self.expires_in_minutes,
        }
        .render()?;

        Email::builder()
            .from(self.config.from_header())
            .to(to)
            .subject(VERIFICATION_SUBJECT)
            .html_body(html)
            .text_body(text)
            .build()
    }
}

#[async_trait]
impl VerificationMailer for CodeMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        user_name: Option<&str>,
        code: &str,
    ) -> Result<(), tollgate_core::Error> {
        let email = self.render(to, user_name, code)?;

        if let Err(e) = self.transport.send_email(email).await {
            tracing::error!(error = %e, "Failed to send verification email");
            return Err(e.into());
        }

        tracing::info!("Verification email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryTransport;
    use tollgate_core::error::DeliveryError;

    struct FailingTransport;

    #[async_trait]
    impl Mailer for FailingTransport {
        async fn send_email(&self, _email: Email) -> Result<(), MailerError> {
            Err(MailerError::Io(std::io::Error::other("relay unreachable")))
        }
    }

    #[tokio::test]
    async fn test_send_verification_code() {
        let outbox = MemoryTransport::new();
        let mailer = CodeMailer::with_transport(MailerConfig::default(), Box::new(outbox.clone()));

        mailer
            .send_verification_code("a@x.com", Some("Ann"), "123456")
            .await
            .unwrap();

        let email = outbox.last_to("a@x.com").unwrap();
        assert_eq!(email.subject, VERIFICATION_SUBJECT);
        assert_eq!(email.from, "Tollgate <no-reply@tollgate.local>");
        assert!(email.text_body.unwrap().contains("123456"));
        assert!(email.html_body.unwrap().contains("expire in 10 minutes"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_delivery_error() {
        let mailer = CodeMailer::with_transport(MailerConfig::default(), Box::new(FailingTransport));

        let result = mailer.send_verification_code("a@x.com", None, "123456").await;
        assert!(matches!(
            result,
            Err(tollgate_core::Error::Delivery(DeliveryError::Send(_)))
        ));
    }
}
