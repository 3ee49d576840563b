#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tollgate::{
    Error, ExternalIdentity, IdentityProvider, SqliteRepositoryProvider, Tollgate,
    VerificationMailer,
};
use tollgate_core::{AuthorizationRequest, error::DeliveryError};

/// Records every code it is asked to send; can be switched to fail
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl CapturingMailer {
    pub async fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl VerificationMailer for CapturingMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        _user_name: Option<&str>,
        code: &str,
    ) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Delivery(DeliveryError::Send(
                "relay unreachable".to_string(),
            )));
        }
        self.sent
            .lock()
            .await
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}

/// Provider that accepts the code `good-code` and asserts a fixed identity
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn authorization_request(&self) -> Result<AuthorizationRequest, Error> {
        Ok(AuthorizationRequest {
            url: "https://idp.test/authorize?state=state-1".to_string(),
            csrf_state: "state-1".to_string(),
            pkce_verifier: "verifier-1".to_string(),
        })
    }

    async fn exchange(&self, code: &str, pkce_verifier: &str) -> Result<ExternalIdentity, Error> {
        if code != "good-code" || pkce_verifier != "verifier-1" {
            return Err(Error::Identity(
                tollgate_core::error::IdentityError::Exchange("rejected".to_string()),
            ));
        }
        Ok(ExternalIdentity {
            subject: "stub-sub-1".to_string(),
            email: "g@x.com".to_string(),
            name: "Gina".to_string(),
            avatar_url: Some("https://img.test/g.png".to_string()),
        })
    }
}

pub async fn tollgate() -> (Tollgate<SqliteRepositoryProvider>, Arc<CapturingMailer>) {
    let _ = tracing_subscriber::fmt().try_init();

    let repositories = SqliteRepositoryProvider::connect("sqlite::memory:")
        .await
        .unwrap();
    let mailer = Arc::new(CapturingMailer::default());
    let tollgate = Tollgate::new(Arc::new(repositories), mailer.clone())
        .with_provider(Arc::new(StubProvider));
    tollgate.migrate().await.unwrap();
    (tollgate, mailer)
}
