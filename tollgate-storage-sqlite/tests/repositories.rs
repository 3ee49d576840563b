use std::sync::Arc;

use chrono::{Duration, Utc};
use tollgate_core::{
    AccountOrigin, Error, NewUser, NewVerificationCode, RepositoryProvider, SessionService,
    SessionToken, VerificationOutcome, VerificationService,
    error::StorageError,
    repositories::{
        OAuthRepository, OAuthRepositoryProvider, PasswordRepository, PasswordRepositoryProvider,
        SessionRepository, SessionRepositoryAdapter, SessionRepositoryProvider, UserRepository,
        UserRepositoryAdapter, UserRepositoryProvider, VerificationCodeRepository,
        VerificationCodeRepositoryAdapter, VerificationCodeRepositoryProvider,
    },
};
use tollgate_storage_sqlite::SqliteRepositoryProvider;

async fn store() -> Arc<SqliteRepositoryProvider> {
    let store = SqliteRepositoryProvider::connect("sqlite::memory:")
        .await
        .expect("Failed to open database");
    store.migrate().await.expect("Failed to migrate");
    Arc::new(store)
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let store = store().await;
    store.migrate().await.unwrap();
    store.health_check().await.unwrap();
}

#[tokio::test]
async fn test_local_user_round_trip() {
    let store = store().await;

    let created = store
        .user()
        .create(NewUser::local("a@x.com", "Ann", "argon-hash"))
        .await
        .unwrap();
    assert!(!created.verified);
    assert_eq!(created.origin, AccountOrigin::Local);

    let by_email = store.user().find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);
    assert!(store.user().find_by_email("A@X.COM").await.unwrap().is_none());

    let hash = store.password().get_password_hash(&created.id).await.unwrap();
    assert_eq!(hash.as_deref(), Some("argon-hash"));

    store.user().mark_email_verified("a@x.com").await.unwrap();
    let verified = store.user().find_by_id(&created.id).await.unwrap().unwrap();
    assert!(verified.verified);
}

#[tokio::test]
async fn test_federated_user_round_trip() {
    let store = store().await;

    let created = store
        .user()
        .create(NewUser::federated(
            "google-123",
            "g@x.com",
            "Gina",
            Some("https://img.test/g.png".to_string()),
        ))
        .await
        .unwrap();
    assert!(created.verified);

    let found = store
        .user()
        .find_by_external_id("google-123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.origin.external_id(), Some("google-123"));
    assert_eq!(found.avatar_url.as_deref(), Some("https://img.test/g.png"));

    let hash = store.password().get_password_hash(&created.id).await.unwrap();
    assert!(hash.is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_constraint_error() {
    let store = store().await;
    store
        .user()
        .create(NewUser::local("a@x.com", "Ann", "hash"))
        .await
        .unwrap();

    let result = store
        .user()
        .create(NewUser::federated("sub-1", "a@x.com", "Other", None))
        .await;
    assert!(matches!(
        result,
        Err(Error::Storage(StorageError::Constraint(_)))
    ));
}

#[tokio::test]
async fn test_search_matches_name_or_email() {
    let store = store().await;
    for (email, name) in [
        ("ann@x.com", "Ann Smith"),
        ("bob@x.com", "Bob Jones"),
        ("carol@annex.io", "Carol"),
        ("percent@x.com", "100% Dave"),
    ] {
        store
            .user()
            .create(NewUser::local(email, name, "hash"))
            .await
            .unwrap();
    }

    let found = store.user().search("ANN", 10).await.unwrap();
    let emails: Vec<_> = found.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["ann@x.com", "carol@annex.io"]);

    assert_eq!(store.user().search("x.com", 2).await.unwrap().len(), 2);

    let literal = store.user().search("%", 10).await.unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].email, "percent@x.com");
}

#[tokio::test]
async fn test_sessions_are_stored_hashed_and_superseded() {
    let store = store().await;
    let user = store
        .user()
        .create(NewUser::local("a@x.com", "Ann", "hash"))
        .await
        .unwrap();

    let sessions = SessionService::new(
        Arc::new(SessionRepositoryAdapter::new(store.clone())),
        Arc::new(UserRepositoryAdapter::new(store.clone())),
    );

    let first = sessions.issue(&user.id).await.unwrap();
    let second = sessions.issue(&user.id).await.unwrap();

    let stored: Vec<String> = sqlx::query_scalar("SELECT token FROM sessions")
        .fetch_all(store.pool())
        .await
        .unwrap();
    assert_eq!(stored, vec![second.token.token_hash()]);
    assert_ne!(stored[0], second.token.as_str());

    assert!(sessions.resolve(&first.token).await.unwrap().is_none());
    let resolved = sessions.resolve(&second.token).await.unwrap().unwrap();
    assert_eq!(resolved.id, user.id);

    sessions.revoke(&second.token).await.unwrap();
    assert!(sessions.resolve(&second.token).await.unwrap().is_none());
    assert_eq!(sessions.session_count(&user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_sessions_are_cleaned_up() {
    let store = store().await;
    let user = store
        .user()
        .create(NewUser::local("a@x.com", "Ann", "hash"))
        .await
        .unwrap();

    let sessions = SessionService::new(
        Arc::new(SessionRepositoryAdapter::new(store.clone())),
        Arc::new(UserRepositoryAdapter::new(store.clone())),
    );
    let expired = sessions
        .issue_with_expiration(&user.id, Duration::seconds(-10))
        .await
        .unwrap();
    assert!(sessions.resolve(&expired.token).await.unwrap().is_none());

    sessions.cleanup_expired_sessions().await.unwrap();
    assert_eq!(store.session().count_by_user_id(&user.id).await.unwrap(), 0);

    let unknown = SessionToken::new_random().unwrap();
    assert!(store.session().find_by_token(&unknown).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_latest_prefers_newest_row() {
    let store = store().await;
    let expires_at = Utc::now() + Duration::minutes(10);

    let older = store
        .verification_code()
        .create(NewVerificationCode {
            email: "a@x.com".to_string(),
            code: "111111".to_string(),
            expires_at,
        })
        .await
        .unwrap();
    let newer = store
        .verification_code()
        .create(NewVerificationCode {
            email: "a@x.com".to_string(),
            code: "111111".to_string(),
            expires_at,
        })
        .await
        .unwrap();
    assert!(newer.id > older.id);

    let latest = store
        .verification_code()
        .find_latest("a@x.com", "111111")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, newer.id);
}

#[tokio::test]
async fn test_verification_code_consumed_once() {
    let store = store().await;
    let service = Arc::new(VerificationService::new(Arc::new(
        VerificationCodeRepositoryAdapter::new(store.clone()),
    )));

    let code = service.issue("a@x.com").await.unwrap();

    let (a, b) = tokio::join!(
        service.verify("a@x.com", &code.code),
        service.verify("a@x.com", &code.code)
    );
    let valid = [a.unwrap(), b.unwrap()]
        .iter()
        .filter(|o| o.is_valid())
        .count();
    assert_eq!(valid, 1);

    assert_eq!(
        service.verify("a@x.com", &code.code).await.unwrap(),
        VerificationOutcome::Invalid
    );
}

#[tokio::test]
async fn test_expired_verification_code() {
    let store = store().await;
    let service = VerificationService::new(Arc::new(VerificationCodeRepositoryAdapter::new(
        store.clone(),
    )));

    let code = service
        .issue_with_expiration("a@x.com", Duration::minutes(-1))
        .await
        .unwrap();
    assert_eq!(
        service.verify("a@x.com", &code.code).await.unwrap(),
        VerificationOutcome::Expired
    );
    assert!(
        !store
            .verification_code()
            .mark_used(code.id, Utc::now())
            .await
            .unwrap()
    );

    assert_eq!(service.cleanup("a@x.com").await.unwrap(), 1);
    assert_eq!(
        service.verify("a@x.com", &code.code).await.unwrap(),
        VerificationOutcome::NotFound
    );
}

#[tokio::test]
async fn test_oauth_state_taken_once() {
    let store = store().await;

    store
        .oauth()
        .store_pkce_verifier("state-1", "verifier-1", Duration::minutes(10))
        .await
        .unwrap();
    store
        .oauth()
        .store_pkce_verifier("state-2", "verifier-2", Duration::minutes(-1))
        .await
        .unwrap();

    assert_eq!(
        store.oauth().take_pkce_verifier("state-1").await.unwrap(),
        Some("verifier-1".to_string())
    );
    assert!(store.oauth().take_pkce_verifier("state-1").await.unwrap().is_none());
    assert!(store.oauth().take_pkce_verifier("state-2").await.unwrap().is_none());
    assert!(store.oauth().take_pkce_verifier("unknown").await.unwrap().is_none());
}
