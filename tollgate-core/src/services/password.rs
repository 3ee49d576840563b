use crate::{
    Error, NewUser, User,
    error::{AuthError, CryptoError, StorageError},
    repositories::{PasswordRepository, UserRepository},
    validation::validate_registration,
};
use std::sync::Arc;

/// Service for password registration and authentication
pub struct PasswordService<U: UserRepository, P: PasswordRepository> {
    user_repository: Arc<U>,
    password_repository: Arc<P>,
}

impl<U: UserRepository, P: PasswordRepository> PasswordService<U, P> {
    /// Create a new PasswordService with the given repositories
    pub fn new(user_repository: Arc<U>, password_repository: Arc<P>) -> Self {
        Self {
            user_repository,
            password_repository,
        }
    }

    /// Register a new local account
    ///
    /// The account starts unverified. Fails with
    /// [`AuthError::UserAlreadyExists`] if the email is taken, including when
    /// a concurrent registration wins the race to insert.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, Error> {
        validate_registration(email, password, name)?;

        if self.user_repository.find_by_email(email).await?.is_some() {
            return Err(Error::Auth(AuthError::UserAlreadyExists));
        }

        let password_hash = hash_password(password).await?;

        match self
            .user_repository
            .create(NewUser::local(email, name.trim(), password_hash))
            .await
        {
            Ok(user) => Ok(user),
            Err(Error::Storage(StorageError::Constraint(_))) => {
                Err(Error::Auth(AuthError::UserAlreadyExists))
            }
            Err(e) => Err(e),
        }
    }

    /// Authenticate a local account by email and password
    ///
    /// Unknown emails, federated accounts, and wrong passwords all fail with
    /// the same [`AuthError::InvalidCredentials`]. The verified flag is only
    /// checked after the password matches.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))?;

        if user.origin.is_federated() {
            return Err(Error::Auth(AuthError::InvalidCredentials));
        }

        let password_hash = self
            .password_repository
            .get_password_hash(&user.id)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))?;

        if !verify_password(password, &password_hash).await? {
            return Err(Error::Auth(AuthError::InvalidCredentials));
        }

        if !user.verified {
            return Err(Error::Auth(AuthError::EmailNotVerified));
        }

        Ok(user)
    }
}

/// Hash a password with a salted argon2 hash, off the async executor.
async fn hash_password(password: &str) -> Result<String, Error> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || password_auth::generate_hash(password))
        .await
        .map_err(|e| Error::Crypto(CryptoError::PasswordHash(e.to_string())))
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || password_auth::verify_password(password, &hash).is_ok())
        .await
        .map_err(|e| Error::Crypto(CryptoError::PasswordHash(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ValidationError, services::testing::MemoryStore};

    fn service() -> (PasswordService<MemoryStore, MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (PasswordService::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn test_register_creates_unverified_local_user() {
        let (service, store) = service();

        let user = service.register("a@x.com", "secret1", "Ann").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "Ann");
        assert!(!user.verified);
        assert!(!user.origin.is_federated());

        let hash = store.get_password_hash(&user.id).await.unwrap().unwrap();
        assert_ne!(hash, "secret1");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _) = service();
        service.register("a@x.com", "secret1", "Ann").await.unwrap();

        let result = service.register("a@x.com", "secret2", "Other").await;
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::UserAlreadyExists))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let (service, _) = service();
        let result = service.register("a@x.com", "12345", "Ann").await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidPassword(_)))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_before_verification() {
        let (service, _) = service();
        service.register("a@x.com", "secret1", "Ann").await.unwrap();

        let result = service.authenticate("a@x.com", "secret1").await;
        assert!(matches!(result, Err(Error::Auth(AuthError::EmailNotVerified))));
    }

    #[tokio::test]
    async fn test_authenticate_after_verification() {
        let (service, store) = service();
        service.register("a@x.com", "secret1", "Ann").await.unwrap();
        store.mark_email_verified("a@x.com").await.unwrap();

        let user = service.authenticate("a@x.com", "secret1").await.unwrap();
        assert!(user.verified);

        let wrong = service.authenticate("a@x.com", "wrong-password").await;
        assert!(matches!(wrong, Err(Error::Auth(AuthError::InvalidCredentials))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let (service, _) = service();
        let result = service.authenticate("nobody@x.com", "secret1").await;
        assert!(matches!(result, Err(Error::Auth(AuthError::InvalidCredentials))));
    }

    #[tokio::test]
    async fn test_authenticate_federated_account() {
        let (service, store) = service();
        UserRepository::create(
            store.as_ref(),
            NewUser::federated("google-sub", "g@x.com", "Gina", None),
        )
        .await
        .unwrap();

        let result = service.authenticate("g@x.com", "anything").await;
        assert!(matches!(result, Err(Error::Auth(AuthError::InvalidCredentials))));
    }
}
