mod common;

use std::sync::Arc;

use tollgate::{Error, ResendOutcome, SessionToken};
use tollgate_core::error::{AuthError, SessionError, ValidationError};

#[tokio::test]
async fn test_register_verify_login_logout() {
    let (tollgate, mailer) = common::tollgate().await;

    let user_id = tollgate.register("a@x.com", "secret1", "Ann").await.unwrap();
    let code = mailer.last_code_for("a@x.com").await.unwrap();
    assert_eq!(code.len(), 6);

    let wrong = if code == "100000" { "100001" } else { "100000" };
    let result = tollgate.verify_email("a@x.com", wrong).await;
    assert!(matches!(
        result,
        Err(Error::Auth(AuthError::InvalidOrExpiredCode))
    ));

    tollgate.verify_email("a@x.com", &code).await.unwrap();
    let result = tollgate.verify_email("a@x.com", &code).await;
    assert!(matches!(
        result,
        Err(Error::Auth(AuthError::InvalidOrExpiredCode))
    ));

    let (user, session) = tollgate.login("a@x.com", "secret1").await.unwrap();
    assert_eq!(user.id, user_id);
    assert!(user.verified);
    assert_eq!(session.token.as_str().len(), 64);

    let me = tollgate.current_user(&session.token).await.unwrap();
    assert_eq!(me.public().email, "a@x.com");
    assert_eq!(me.public().name, "Ann");

    tollgate.logout(Some(&session.token)).await.unwrap();
    let result = tollgate.current_user(&session.token).await;
    assert!(matches!(result, Err(Error::Session(SessionError::NotFound))));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let (tollgate, _) = common::tollgate().await;
    tollgate.register("a@x.com", "secret1", "Ann").await.unwrap();

    let result = tollgate.register("a@x.com", "secret2", "Other").await;
    assert!(matches!(result, Err(Error::Auth(AuthError::UserAlreadyExists))));

    let result = tollgate.register("b@x.com", "short", "Bob").await;
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::InvalidPassword(_)))
    ));
}

#[tokio::test]
async fn test_login_before_verification() {
    let (tollgate, _) = common::tollgate().await;
    tollgate.register("a@x.com", "secret1", "Ann").await.unwrap();

    let result = tollgate.login("a@x.com", "secret1").await;
    assert!(matches!(result, Err(Error::Auth(AuthError::EmailNotVerified))));

    let result = tollgate.login("a@x.com", "wrong-password").await;
    assert!(matches!(result, Err(Error::Auth(AuthError::InvalidCredentials))));

    let result = tollgate.login("nobody@x.com", "secret1").await;
    assert!(matches!(result, Err(Error::Auth(AuthError::InvalidCredentials))));
}

#[tokio::test]
async fn test_second_login_supersedes_first() {
    let (tollgate, mailer) = common::tollgate().await;
    tollgate.register("a@x.com", "secret1", "Ann").await.unwrap();
    let code = mailer.last_code_for("a@x.com").await.unwrap();
    tollgate.verify_email("a@x.com", &code).await.unwrap();

    let (_, first) = tollgate.login("a@x.com", "secret1").await.unwrap();
    let (_, second) = tollgate.login("a@x.com", "secret1").await.unwrap();

    assert!(tollgate.current_user(&first.token).await.is_err());
    assert!(tollgate.current_user(&second.token).await.is_ok());
}

#[tokio::test]
async fn test_logout_without_token() {
    let (tollgate, _) = common::tollgate().await;

    let result = tollgate.logout(None).await;
    assert!(matches!(result, Err(Error::Session(SessionError::NoSession))));

    let unknown = SessionToken::new_random().unwrap();
    tollgate.logout(Some(&unknown)).await.unwrap();
}

#[tokio::test]
async fn test_mail_failure_keeps_account_for_resend() {
    let (tollgate, mailer) = common::tollgate().await;

    mailer.fail(true);
    let result = tollgate.register("a@x.com", "secret1", "Ann").await;
    assert!(matches!(result, Err(Error::Delivery(_))));

    let result = tollgate.register("a@x.com", "secret1", "Ann").await;
    assert!(matches!(result, Err(Error::Auth(AuthError::UserAlreadyExists))));

    mailer.fail(false);
    assert_eq!(
        tollgate.resend_code("a@x.com").await.unwrap(),
        ResendOutcome::Sent
    );
    let code = mailer.last_code_for("a@x.com").await.unwrap();
    tollgate.verify_email("a@x.com", &code).await.unwrap();

    assert_eq!(
        tollgate.resend_code("a@x.com").await.unwrap(),
        ResendOutcome::AlreadyVerified
    );
    assert_eq!(mailer.sent_count().await, 1);

    let result = tollgate.resend_code("nobody@x.com").await;
    assert!(matches!(result, Err(Error::Auth(AuthError::UserNotFound))));
}

#[tokio::test]
async fn test_concurrent_verification_succeeds_once() {
    let (tollgate, mailer) = common::tollgate().await;
    let tollgate = Arc::new(tollgate);
    tollgate.register("a@x.com", "secret1", "Ann").await.unwrap();
    let code = mailer.last_code_for("a@x.com").await.unwrap();

    let (a, b) = tokio::join!(
        tollgate.verify_email("a@x.com", &code),
        tollgate.verify_email("a@x.com", &code)
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
}

#[tokio::test]
async fn test_search_users() {
    let (tollgate, _) = common::tollgate().await;
    tollgate.register("ann@x.com", "secret1", "Ann").await.unwrap();
    tollgate.register("bob@x.com", "secret1", "Bob").await.unwrap();

    let found = tollgate.search_users("ann", None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(tollgate.search_users("", None).await.unwrap().is_empty());

    tollgate.cleanup().await.unwrap();
    tollgate.health_check().await.unwrap();
}
