//! In-memory repositories for service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::{
    Error, NewUser, Session, User, UserId,
    error::StorageError,
    repositories::{
        OAuthRepository, PasswordRepository, SessionRepository, UserRepository,
        VerificationCodeRepository,
    },
    session::SessionToken,
    verification::{NewVerificationCode, VerificationCode},
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<(User, Option<String>)>>,
    sessions: Mutex<HashMap<String, Session>>,
    codes: Mutex<Vec<VerificationCode>>,
    pkce: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let mut users = self.users.lock().await;
        if users.iter().any(|(u, _)| u.email == user.email) {
            return Err(Error::Storage(StorageError::Constraint(
                "UNIQUE constraint failed: users.email".to_string(),
            )));
        }
        let created = User {
            id: UserId::new(users.len() as i64 + 1),
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            origin: user.origin,
            verified: user.verified,
            created_at: Utc::now(),
        };
        users.push((created.clone(), user.password_hash));
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|(u, _)| u.id == *id).map(|(u, _)| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|(u, _)| u.email == email).map(|(u, _)| u.clone()))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, Error> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|(u, _)| u.origin.external_id() == Some(external_id))
            .map(|(u, _)| u.clone()))
    }

    async fn mark_email_verified(&self, email: &str) -> Result<(), Error> {
        let mut users = self.users.lock().await;
        for (user, _) in users.iter_mut().filter(|(u, _)| u.email == email) {
            user.verified = true;
        }
        Ok(())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<User>, Error> {
        let needle = query.to_lowercase();
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .filter(|(u, _)| {
                u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
            .take(limit as usize)
            .map(|(u, _)| u.clone())
            .collect())
    }
}

#[async_trait]
impl PasswordRepository for MemoryStore {
    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|(u, _)| u.id == *user_id)
            .and_then(|(_, hash)| hash.clone()))
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        self.sessions
            .lock()
            .await
            .insert(session.token.token_hash(), session.clone());
        Ok(session)
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        Ok(self.sessions.lock().await.get(&token.token_hash()).cloned())
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), Error> {
        self.sessions.lock().await.remove(&token.token_hash());
        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<(), Error> {
        self.sessions
            .lock()
            .await
            .retain(|_, session| session.user_id != *user_id);
        Ok(())
    }

    async fn count_by_user_id(&self, user_id: &UserId) -> Result<u64, Error> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.values().filter(|s| s.user_id == *user_id).count() as u64)
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        let now = Utc::now();
        self.sessions.lock().await.retain(|_, s| s.expires_at >= now);
        Ok(())
    }
}

#[async_trait]
impl VerificationCodeRepository for MemoryStore {
    async fn create(&self, code: NewVerificationCode) -> Result<VerificationCode, Error> {
        let mut codes = self.codes.lock().await;
        let row = VerificationCode {
            id: codes.len() as i64 + 1,
            email: code.email,
            code: code.code,
            expires_at: code.expires_at,
            used: false,
            created_at: Utc::now(),
        };
        codes.push(row.clone());
        Ok(row)
    }

    async fn find_latest(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<VerificationCode>, Error> {
        let codes = self.codes.lock().await;
        Ok(codes
            .iter()
            .filter(|c| c.email == email && c.code == code)
            .max_by_key(|c| (c.created_at, c.id))
            .cloned())
    }

    async fn mark_used(&self, id: i64, now: DateTime<Utc>) -> Result<bool, Error> {
        let mut codes = self.codes.lock().await;
        match codes
            .iter_mut()
            .find(|c| c.id == id && !c.used && c.expires_at >= now)
        {
            Some(code) => {
                code.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired_for_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let mut codes = self.codes.lock().await;
        let before = codes.len();
        codes.retain(|c| !(c.email == email && c.expires_at < now));
        Ok((before - codes.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let mut codes = self.codes.lock().await;
        let before = codes.len();
        codes.retain(|c| c.expires_at >= now);
        Ok((before - codes.len()) as u64)
    }
}

#[async_trait]
impl OAuthRepository for MemoryStore {
    async fn store_pkce_verifier(
        &self,
        csrf_state: &str,
        pkce_verifier: &str,
        expires_in: Duration,
    ) -> Result<(), Error> {
        self.pkce.lock().await.insert(
            csrf_state.to_string(),
            (pkce_verifier.to_string(), Utc::now() + expires_in),
        );
        Ok(())
    }

    async fn take_pkce_verifier(&self, csrf_state: &str) -> Result<Option<String>, Error> {
        let entry = self.pkce.lock().await.remove(csrf_state);
        Ok(entry
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(verifier, _)| verifier))
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        let now = Utc::now();
        self.pkce.lock().await.retain(|_, (_, expires_at)| *expires_at > now);
        Ok(())
    }
}
