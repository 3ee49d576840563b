use crate::Error;
use async_trait::async_trait;

/// Outbound delivery of verification codes
///
/// Implemented by `tollgate-mailer`'s `CodeMailer`. Delivery failures are
/// reported as [`crate::error::DeliveryError`].
#[async_trait]
pub trait VerificationMailer: Send + Sync + 'static {
    async fn send_verification_code(
        &self,
        to: &str,
        user_name: Option<&str>,
        code: &str,
    ) -> Result<(), Error>;
}
