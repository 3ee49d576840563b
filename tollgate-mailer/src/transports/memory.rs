use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Keeps sent emails in memory
///
/// Clones share the same outbox, so a test can keep one handle and give the
/// other to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every email sent so far, oldest first
    pub fn sent(&self) -> Vec<Email> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The most recent email sent to `to`
    pub fn last_to(&self, to: &str) -> Option<Email> {
        self.sent()
            .into_iter()
            .rev()
            .find(|email| email.to.iter().any(|r| r == to))
    }
}

#[async_trait]
impl Mailer for MemoryTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(email);
        Ok(())
    }
}
