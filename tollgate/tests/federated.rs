mod common;

use tollgate::{Error, ExternalIdentity};
use tollgate_core::{
    AccountOrigin,
    error::{AuthError, IdentityError},
};

#[tokio::test]
async fn test_federated_login_round_trip() {
    let (tollgate, _) = common::tollgate().await;
    assert!(tollgate.has_provider("stub"));

    let url = tollgate.begin_federated_login("stub").await.unwrap();
    assert!(url.starts_with("https://idp.test/authorize"));

    let (user, session) = tollgate
        .finish_federated_login("stub", "good-code", "state-1")
        .await
        .unwrap();
    assert!(user.verified);
    assert_eq!(
        user.origin,
        AccountOrigin::Federated {
            external_id: "stub-sub-1".to_string()
        }
    );
    assert_eq!(
        tollgate.current_user(&session.token).await.unwrap().id,
        user.id
    );

    // The state was consumed by the first callback.
    let result = tollgate
        .finish_federated_login("stub", "good-code", "state-1")
        .await;
    assert!(matches!(
        result,
        Err(Error::Identity(IdentityError::InvalidState))
    ));
}

#[tokio::test]
async fn test_repeat_federated_login_reuses_account() {
    let (tollgate, _) = common::tollgate().await;
    let identity = ExternalIdentity {
        subject: "sub-9".to_string(),
        email: "f@x.com".to_string(),
        name: "Fay".to_string(),
        avatar_url: None,
    };

    let (first_user, first) = tollgate.complete_federated_login(&identity).await.unwrap();
    let (second_user, second) = tollgate.complete_federated_login(&identity).await.unwrap();

    assert_eq!(first_user.id, second_user.id);
    assert!(tollgate.current_user(&first.token).await.is_err());
    assert!(tollgate.current_user(&second.token).await.is_ok());

    // Federated accounts have no password to log in with.
    let result = tollgate.login("f@x.com", "anything").await;
    assert!(matches!(result, Err(Error::Auth(AuthError::InvalidCredentials))));
}

#[tokio::test]
async fn test_federated_email_clash_is_conflict() {
    let (tollgate, _) = common::tollgate().await;
    tollgate.register("g@x.com", "secret1", "Local Gina").await.unwrap();

    tollgate.begin_federated_login("stub").await.unwrap();
    let result = tollgate
        .finish_federated_login("stub", "good-code", "state-1")
        .await;
    assert!(matches!(result, Err(Error::Auth(AuthError::UserAlreadyExists))));
}

#[tokio::test]
async fn test_unknown_provider() {
    let (tollgate, _) = common::tollgate().await;

    let result = tollgate.begin_federated_login("github").await;
    assert!(matches!(
        result,
        Err(Error::Identity(IdentityError::UnknownProvider(_)))
    ));
}
