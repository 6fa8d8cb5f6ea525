use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{Credentials, Profile},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    config::JwtConfig,
    error::AppError,
};

/// Result of a successful login or signup.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
}

/// Backend behind `/auth/login` and `/auth/signup`.
///
/// Handlers have already checked that `username` and `password` are
/// non-empty before calling in.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: Credentials) -> Result<Session, AppError>;
    async fn signup(&self, profile: Profile) -> Result<Session, AppError>;
}

/// Accepts every well-formed request. No verification, nothing stored.
#[derive(Debug, Clone, Default)]
pub struct StubAuthService;

#[async_trait]
impl AuthService for StubAuthService {
    async fn login(&self, credentials: Credentials) -> Result<Session, AppError> {
        debug!(username = %credentials.username, "stub login accepted");
        Ok(Session::default())
    }

    async fn signup(&self, profile: Profile) -> Result<Session, AppError> {
        debug!(username = %profile.username, "stub signup accepted");
        Ok(Session::default())
    }
}

struct StoredUser {
    id: Uuid,
    password_hash: String,
    profile: Profile,
}

/// Keeps users in process memory for the lifetime of the server.
pub struct MemoryAuthService {
    users: RwLock<HashMap<String, StoredUser>>,
    keys: JwtKeys,
}

impl MemoryAuthService {
    pub fn new(jwt: &JwtConfig) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            keys: JwtKeys::new(jwt),
        }
    }

    /// Stored profile for `username`, password cleared.
    #[cfg(test)]
    pub(crate) async fn profile(&self, username: &str) -> Option<Profile> {
        self.users
            .read()
            .await
            .get(username)
            .map(|user| user.profile.clone())
    }

    fn issue(&self, user_id: Uuid) -> Result<Session, AppError> {
        let token = self.keys.sign(user_id)?;
        Ok(Session { token: Some(token) })
    }
}

#[async_trait]
impl AuthService for MemoryAuthService {
    async fn login(&self, credentials: Credentials) -> Result<Session, AppError> {
        let (user_id, hash, display_name) = {
            let users = self.users.read().await;
            let Some(user) = users.get(&credentials.username) else {
                warn!(username = %credentials.username, "login unknown username");
                return Err(AppError::UnknownUser);
            };
            (user.id, user.password_hash.clone(), user.profile.name.clone())
        };

        if !verify_password(&credentials.password, &hash)? {
            warn!(username = %credentials.username, %user_id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        info!(username = %credentials.username, %user_id, name = %display_name, "login accepted");
        self.issue(user_id)
    }

    async fn signup(&self, mut profile: Profile) -> Result<Session, AppError> {
        // Hash outside the write lock.
        let password_hash = hash_password(&profile.password)?;
        profile.password.clear();

        let user_id = Uuid::new_v4();
        {
            let mut users = self.users.write().await;
            if users.contains_key(&profile.username) {
                warn!(username = %profile.username, "username already registered");
                return Err(AppError::UserAlreadyExists);
            }
            users.insert(
                profile.username.clone(),
                StoredUser {
                    id: user_id,
                    password_hash,
                    profile,
                },
            );
        }

        self.issue(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        }
    }

    fn profile(username: &str, password: &str) -> Profile {
        Profile {
            username: username.into(),
            password: password.into(),
            name: "Amy".into(),
            food_habits: "vegan".into(),
            ..Profile::default()
        }
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn stub_accepts_anything_and_issues_no_token() {
        let svc = StubAuthService;
        let session = svc.login(creds("who", "ever")).await.unwrap();
        assert!(session.token.is_none());
        let session = svc.signup(profile("who", "ever")).await.unwrap();
        assert!(session.token.is_none());
    }

    #[tokio::test]
    async fn memory_signup_then_login_issues_verifiable_tokens() {
        let svc = MemoryAuthService::new(&jwt());
        let signup = svc.signup(profile("amy", "pw-123")).await.unwrap();
        let login = svc.login(creds("amy", "pw-123")).await.unwrap();

        let keys = JwtKeys::new(&jwt());
        let a = keys.verify(signup.token.as_deref().unwrap()).unwrap();
        let b = keys.verify(login.token.as_deref().unwrap()).unwrap();
        assert_eq!(a.sub, b.sub);
    }

    #[tokio::test]
    async fn memory_keeps_profile_without_plain_password() {
        let svc = MemoryAuthService::new(&jwt());
        svc.signup(profile("amy", "pw-123")).await.unwrap();
        let stored = svc.profile("amy").await.unwrap();
        assert_eq!(stored.food_habits, "vegan");
        assert!(stored.password.is_empty());
        assert!(svc.profile("bob").await.is_none());
    }

    #[tokio::test]
    async fn memory_rejects_duplicate_username() {
        let svc = MemoryAuthService::new(&jwt());
        svc.signup(profile("amy", "pw")).await.unwrap();
        let err = svc.signup(profile("amy", "other")).await.unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn memory_login_failures() {
        let svc = MemoryAuthService::new(&jwt());
        svc.signup(profile("amy", "pw")).await.unwrap();

        let err = svc.login(creds("bob", "pw")).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownUser));

        let err = svc.login(creds("amy", "wrong")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
