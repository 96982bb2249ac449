//! Authentication client
//!
//! The live client talks to no real backend: it accepts one known account,
//! simulates server latency on the injected clock and keeps its session in
//! secure persistence so it survives restarts. The mock keeps everything in
//! memory and answers immediately unless given a latency.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wellness_core::{
    AuthCredentials, AuthProvider, AuthToken, AuthenticationError, PersistenceError, StorageType,
    User,
};

use crate::date::DateClient;
use crate::persistence::{get_json, set_json, PersistenceClient};
use crate::sync::Locked;

/// Account accepted by the demo backends
pub const KNOWN_EMAIL: &str = "test@example.com";
pub const KNOWN_PASSWORD: &str = "password";
pub const KNOWN_USER_ID: &str = "12345";
pub const KNOWN_USER_NAME: &str = "Test User";

/// Persistence key of the live session
pub const SESSION_KEY: &str = "auth.session";

#[async_trait]
pub trait AuthenticationClient: Send + Sync {
    async fn login(&self, credentials: AuthCredentials) -> Result<AuthToken, AuthenticationError>;

    async fn login_with_social(
        &self,
        provider: AuthProvider,
        token: String,
    ) -> Result<AuthToken, AuthenticationError>;

    async fn logout(&self) -> Result<(), AuthenticationError>;

    /// Exchange a refresh token for a new session token
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthToken, AuthenticationError>;

    async fn sign_up(
        &self,
        credentials: AuthCredentials,
        password: String,
    ) -> Result<User, AuthenticationError>;

    async fn reset_password(&self, email: String) -> Result<(), AuthenticationError>;

    async fn current_user(&self) -> Option<User>;

    async fn update_profile(&self, user: User) -> Result<User, AuthenticationError>;

    async fn delete_account(&self, password: String) -> Result<(), AuthenticationError>;

    async fn is_token_valid(&self) -> bool;
}

fn known_user(created_at: chrono::DateTime<chrono::Utc>) -> User {
    User::new(KNOWN_USER_ID, KNOWN_EMAIL, KNOWN_USER_NAME, created_at)
}

fn is_known_account(credentials: &AuthCredentials) -> bool {
    credentials.email == KNOWN_EMAIL && credentials.password == KNOWN_PASSWORD
}

fn social_user(provider: AuthProvider, created_at: chrono::DateTime<chrono::Utc>) -> User {
    User::new(
        Uuid::new_v4().to_string(),
        format!("user@{}.com", provider.as_str()),
        format!("{} User", provider.display_name()),
        created_at,
    )
}

fn signed_up_user(
    credentials: &AuthCredentials,
    password: &str,
    created_at: chrono::DateTime<chrono::Utc>,
) -> Result<User, AuthenticationError> {
    credentials.validate_sign_up(password)?;
    Ok(User::new(
        Uuid::new_v4().to_string(),
        credentials.email.clone(),
        credentials.display_name(),
        created_at,
    ))
}

fn storage_error(err: PersistenceError) -> AuthenticationError {
    AuthenticationError::UnknownError(err.to_string())
}

// ── Live ────────────────────────────────────────────────────────────────────

/// Simulated server round-trip per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthLatency {
    pub login: Duration,
    pub social_login: Duration,
    pub logout: Duration,
    pub refresh: Duration,
    pub sign_up: Duration,
    pub reset_password: Duration,
    pub current_user: Duration,
    pub update_profile: Duration,
    pub delete_account: Duration,
    pub token_check: Duration,
}

impl AuthLatency {
    pub const NONE: AuthLatency = AuthLatency {
        login: Duration::ZERO,
        social_login: Duration::ZERO,
        logout: Duration::ZERO,
        refresh: Duration::ZERO,
        sign_up: Duration::ZERO,
        reset_password: Duration::ZERO,
        current_user: Duration::ZERO,
        update_profile: Duration::ZERO,
        delete_account: Duration::ZERO,
        token_check: Duration::ZERO,
    };
}

impl Default for AuthLatency {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(1000),
            social_login: Duration::from_millis(1000),
            logout: Duration::from_millis(500),
            refresh: Duration::from_millis(500),
            sign_up: Duration::from_millis(1000),
            reset_password: Duration::from_millis(1000),
            current_user: Duration::from_millis(500),
            update_profile: Duration::from_millis(1000),
            delete_account: Duration::from_millis(2000),
            token_check: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    token: AuthToken,
}

pub struct LiveAuthenticationClient {
    persistence: Arc<dyn PersistenceClient>,
    date: Arc<dyn DateClient>,
    latency: AuthLatency,
}

impl LiveAuthenticationClient {
    pub fn new(
        persistence: Arc<dyn PersistenceClient>,
        date: Arc<dyn DateClient>,
        latency: AuthLatency,
    ) -> Self {
        Self {
            persistence,
            date,
            latency,
        }
    }

    async fn delay(&self, duration: Duration) {
        if !duration.is_zero() {
            self.date.sleep(duration).await;
        }
    }

    async fn load_session(&self) -> Result<Option<StoredSession>, AuthenticationError> {
        get_json(self.persistence.as_ref(), SESSION_KEY, StorageType::Secure)
            .await
            .map_err(storage_error)
    }

    async fn store_session(&self, session: Option<&StoredSession>) -> Result<(), AuthenticationError> {
        set_json(self.persistence.as_ref(), SESSION_KEY, session, StorageType::Secure)
            .await
            .map_err(storage_error)
    }

    /// Issue a token for `user` and persist it as the current session
    async fn open_session(&self, user: User, prefix: &str) -> Result<AuthToken, AuthenticationError> {
        let id = Uuid::new_v4().simple();
        let token = AuthToken::issue(
            format!("{prefix}_token_{id}"),
            format!("{prefix}_refresh_{id}"),
            self.date.now(),
            user,
        );
        self.store_session(Some(&StoredSession {
            token: token.clone(),
        }))
        .await?;
        Ok(token)
    }

    /// The stored session, if present and unexpired
    async fn valid_session(&self) -> Option<StoredSession> {
        match self.load_session().await {
            Ok(Some(session)) if session.token.is_valid_at(self.date.now()) => Some(session),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to read session: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl AuthenticationClient for LiveAuthenticationClient {
    async fn login(&self, credentials: AuthCredentials) -> Result<AuthToken, AuthenticationError> {
        self.delay(self.latency.login).await;
        if !is_known_account(&credentials) {
            tracing::debug!("Rejected login for {}", credentials.email);
            return Err(AuthenticationError::InvalidCredentials);
        }
        self.open_session(known_user(self.date.now()), "jwt").await
    }

    async fn login_with_social(
        &self,
        provider: AuthProvider,
        _token: String,
    ) -> Result<AuthToken, AuthenticationError> {
        self.delay(self.latency.social_login).await;
        let user = social_user(provider, self.date.now());
        self.open_session(user, &format!("social_{}", provider.as_str()))
            .await
    }

    async fn logout(&self) -> Result<(), AuthenticationError> {
        self.delay(self.latency.logout).await;
        self.store_session(None).await
    }

    async fn refresh_token(&self, refresh_token: String) -> Result<AuthToken, AuthenticationError> {
        self.delay(self.latency.refresh).await;
        match self.load_session().await? {
            Some(session) if session.token.refresh_token == refresh_token => {
                self.open_session(session.token.user, "refreshed").await
            }
            _ => Err(AuthenticationError::TokenExpired),
        }
    }

    async fn sign_up(
        &self,
        credentials: AuthCredentials,
        password: String,
    ) -> Result<User, AuthenticationError> {
        self.delay(self.latency.sign_up).await;
        signed_up_user(&credentials, &password, self.date.now())
    }

    async fn reset_password(&self, email: String) -> Result<(), AuthenticationError> {
        self.delay(self.latency.reset_password).await;
        tracing::info!("Password reset requested for {}", email);
        Ok(())
    }

    async fn current_user(&self) -> Option<User> {
        self.delay(self.latency.current_user).await;
        self.valid_session().await.map(|s| s.token.user)
    }

    async fn update_profile(&self, user: User) -> Result<User, AuthenticationError> {
        self.delay(self.latency.update_profile).await;
        if let Some(mut session) = self.load_session().await? {
            if session.token.user.id == user.id {
                session.token.user = user.clone();
                self.store_session(Some(&session)).await?;
            }
        }
        Ok(user)
    }

    async fn delete_account(&self, _password: String) -> Result<(), AuthenticationError> {
        self.delay(self.latency.delete_account).await;
        self.store_session(None).await
    }

    async fn is_token_valid(&self) -> bool {
        self.delay(self.latency.token_check).await;
        self.valid_session().await.is_some()
    }
}

// ── Mock ────────────────────────────────────────────────────────────────────

/// In-memory session; instantaneous unless a latency is set
#[derive(Debug, Default)]
pub struct MockAuthenticationClient {
    current_user: Locked<Option<User>>,
    is_logged_in: Locked<bool>,
    refresh_token: Locked<Option<String>>,
    latency: Duration,
}

impl MockAuthenticationClient {
    pub const TOKEN: &'static str = "mock_jwt_token";
    pub const REFRESH_TOKEN: &'static str = "mock_refresh_token";

    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the same artificial delay to every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Start with `user` already signed in
    pub fn signed_in(self, user: User) -> Self {
        self.current_user.set(Some(user));
        self.is_logged_in.set(true);
        self.refresh_token.set(Some(Self::REFRESH_TOKEN.to_string()));
        self
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn sign_in(&self, user: &User, refresh_token: &str) {
        self.current_user.set(Some(user.clone()));
        self.is_logged_in.set(true);
        self.refresh_token.set(Some(refresh_token.to_string()));
    }

    fn sign_out(&self) {
        self.current_user.set(None);
        self.is_logged_in.set(false);
        self.refresh_token.set(None);
    }
}

#[async_trait]
impl AuthenticationClient for MockAuthenticationClient {
    async fn login(&self, credentials: AuthCredentials) -> Result<AuthToken, AuthenticationError> {
        self.delay().await;
        if !is_known_account(&credentials) {
            return Err(AuthenticationError::InvalidCredentials);
        }
        let now = chrono::Utc::now();
        let token = AuthToken::issue(Self::TOKEN, Self::REFRESH_TOKEN, now, known_user(now));
        self.sign_in(&token.user, &token.refresh_token);
        Ok(token)
    }

    async fn login_with_social(
        &self,
        provider: AuthProvider,
        _token: String,
    ) -> Result<AuthToken, AuthenticationError> {
        self.delay().await;
        let now = chrono::Utc::now();
        let token = AuthToken::issue(
            format!("social_token_{}", provider.as_str()),
            format!("social_refresh_{}", provider.as_str()),
            now,
            social_user(provider, now),
        );
        self.sign_in(&token.user, &token.refresh_token);
        Ok(token)
    }

    async fn logout(&self) -> Result<(), AuthenticationError> {
        self.delay().await;
        self.sign_out();
        Ok(())
    }

    async fn refresh_token(&self, refresh_token: String) -> Result<AuthToken, AuthenticationError> {
        self.delay().await;
        if self.refresh_token.get().as_deref() != Some(refresh_token.as_str()) {
            return Err(AuthenticationError::TokenExpired);
        }
        let now = chrono::Utc::now();
        let user = self.current_user.get().unwrap_or_else(|| known_user(now));
        let token = AuthToken::issue("refreshed_jwt_token", "new_refresh_token", now, user);
        self.refresh_token.set(Some(token.refresh_token.clone()));
        Ok(token)
    }

    async fn sign_up(
        &self,
        credentials: AuthCredentials,
        password: String,
    ) -> Result<User, AuthenticationError> {
        self.delay().await;
        let user = signed_up_user(&credentials, &password, chrono::Utc::now())?;
        self.current_user.set(Some(user.clone()));
        self.is_logged_in.set(true);
        Ok(user)
    }

    async fn reset_password(&self, _email: String) -> Result<(), AuthenticationError> {
        self.delay().await;
        Ok(())
    }

    async fn current_user(&self) -> Option<User> {
        self.delay().await;
        self.current_user.get()
    }

    async fn update_profile(&self, user: User) -> Result<User, AuthenticationError> {
        self.delay().await;
        self.current_user.set(Some(user.clone()));
        Ok(user)
    }

    async fn delete_account(&self, _password: String) -> Result<(), AuthenticationError> {
        self.delay().await;
        self.sign_out();
        Ok(())
    }

    async fn is_token_valid(&self) -> bool {
        self.delay().await;
        self.is_logged_in.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::MockDateClient;
    use crate::persistence::MockPersistenceClient;
    use chrono::{DateTime, TimeDelta, Utc};

    fn valid() -> AuthCredentials {
        AuthCredentials::new(KNOWN_EMAIL, KNOWN_PASSWORD)
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn live_with(date: Arc<dyn DateClient>) -> (LiveAuthenticationClient, Arc<MockPersistenceClient>) {
        let persistence = Arc::new(MockPersistenceClient::new());
        let client = LiveAuthenticationClient::new(persistence.clone(), date, AuthLatency::default());
        (client, persistence)
    }

    // ── Mock ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_mock_login_success() {
        let client = MockAuthenticationClient::new();
        let token = client.login(valid()).await.unwrap();

        assert_eq!(token.token, "mock_jwt_token");
        assert_eq!(token.user.email, "test@example.com");
        assert_eq!(token.user.name, "Test User");
        assert!(token.is_valid());
        assert!(client.is_token_valid().await);
        assert_eq!(client.current_user().await, Some(token.user));
    }

    #[tokio::test]
    async fn test_mock_login_failure() {
        let client = MockAuthenticationClient::new();
        let err = client
            .login(AuthCredentials::new("wrong@example.com", "wrongpassword"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthenticationError::InvalidCredentials);
        assert!(!client.is_token_valid().await);
    }

    #[tokio::test]
    async fn test_mock_social_login() {
        let client = MockAuthenticationClient::new();
        let token = client
            .login_with_social(AuthProvider::Google, "google_token".into())
            .await
            .unwrap();
        assert_eq!(token.user.email, "user@google.com");
        assert_eq!(token.user.name, "Google User");
        assert_eq!(token.token, "social_token_google");
    }

    #[tokio::test]
    async fn test_mock_logout_clears_session() {
        let client = MockAuthenticationClient::new();
        client.login(valid()).await.unwrap();
        client.logout().await.unwrap();

        assert_eq!(client.current_user().await, None);
        assert!(!client.is_token_valid().await);
    }

    #[tokio::test]
    async fn test_mock_sign_up() {
        let client = MockAuthenticationClient::new();
        let user = client
            .sign_up(
                AuthCredentials::new("newuser@example.com", "password123"),
                "password123".into(),
            )
            .await
            .unwrap();
        assert_eq!(user.email, "newuser@example.com");
        assert_eq!(user.name, "newuser");
        assert!(client.is_token_valid().await);
    }

    #[tokio::test]
    async fn test_mock_sign_up_validation() {
        let client = MockAuthenticationClient::new();
        let weak = client
            .sign_up(AuthCredentials::new("new@example.com", "short"), "short".into())
            .await;
        assert_eq!(weak, Err(AuthenticationError::WeakPassword));

        let bad_email = client
            .sign_up(AuthCredentials::new("nope", "password123"), "password123".into())
            .await;
        assert_eq!(bad_email, Err(AuthenticationError::InvalidEmail));
        assert_eq!(client.current_user().await, None);
    }

    #[tokio::test]
    async fn test_mock_refresh_rotates_token() {
        let client = MockAuthenticationClient::new();
        let first = client.login(valid()).await.unwrap();

        let refreshed = client.refresh_token(first.refresh_token.clone()).await.unwrap();
        assert_eq!(refreshed.token, "refreshed_jwt_token");
        assert_eq!(refreshed.user.id, "12345");

        let reused = client.refresh_token(first.refresh_token).await;
        assert_eq!(reused, Err(AuthenticationError::TokenExpired));

        assert!(client.refresh_token(refreshed.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_update_profile_and_delete() {
        let client = MockAuthenticationClient::new();
        let token = client.login(valid()).await.unwrap();

        let renamed = token.user.clone().with_name("Renamed");
        assert_eq!(client.update_profile(renamed.clone()).await, Ok(renamed.clone()));
        assert_eq!(client.current_user().await, Some(renamed));

        client.delete_account("password".into()).await.unwrap();
        assert_eq!(client.current_user().await, None);
    }

    #[tokio::test]
    async fn test_mock_latency_is_applied() {
        let client = MockAuthenticationClient::new().with_latency(Duration::from_millis(30));
        let started = tokio::time::Instant::now();
        client.reset_password("a@b.com".into()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    // ── Live ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_live_login_persists_session() {
        let date = Arc::new(MockDateClient::fixed(at("2024-05-15T10:00:00Z")));
        let (client, persistence) = live_with(date.clone());

        let token = client.login(valid()).await.unwrap();
        assert_eq!(token.user.id, "12345");
        assert_eq!(token.expires_at, at("2024-05-15T11:00:00Z"));
        assert!(persistence.contains(SESSION_KEY, StorageType::Secure));

        assert_eq!(client.current_user().await.map(|u| u.id), Some("12345".into()));
        assert!(client.is_token_valid().await);
        // Latency runs on the injected clock
        assert_eq!(date.sleeps()[0], Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_live_rejects_unknown_account() {
        let (client, persistence) = live_with(Arc::new(MockDateClient::default()));
        let err = client
            .login(AuthCredentials::new(KNOWN_EMAIL, "nope"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthenticationError::InvalidCredentials);
        assert!(!persistence.contains(SESSION_KEY, StorageType::Secure));
    }

    #[tokio::test]
    async fn test_live_session_expires() {
        let date = Arc::new(MockDateClient::advancing(
            at("2024-05-15T10:00:00Z"),
            TimeDelta::minutes(40),
        ));
        let (client, _) = live_with(date);

        // each now() advances: issued 11:20, checked 12:00 then 12:40
        client.login(valid()).await.unwrap();
        assert!(client.is_token_valid().await);
        assert!(!client.is_token_valid().await);
    }

    #[tokio::test]
    async fn test_live_refresh_requires_stored_token() {
        let (client, _) = live_with(Arc::new(MockDateClient::default()));
        assert_eq!(
            client.refresh_token("whatever".into()).await,
            Err(AuthenticationError::TokenExpired)
        );

        let token = client.login(valid()).await.unwrap();
        let refreshed = client.refresh_token(token.refresh_token).await.unwrap();
        assert!(refreshed.token.starts_with("refreshed_token_"));
        assert_eq!(refreshed.user.id, "12345");
    }

    #[tokio::test]
    async fn test_live_logout_and_delete_clear_session() {
        let (client, persistence) = live_with(Arc::new(MockDateClient::default()));
        client.login(valid()).await.unwrap();
        client.logout().await.unwrap();
        assert!(!persistence.contains(SESSION_KEY, StorageType::Secure));
        assert_eq!(client.current_user().await, None);

        client
            .login_with_social(AuthProvider::Apple, "apple".into())
            .await
            .unwrap();
        client.delete_account("pw".into()).await.unwrap();
        assert!(!client.is_token_valid().await);
    }

    #[tokio::test]
    async fn test_live_update_profile_rewrites_session_user() {
        let (client, _) = live_with(Arc::new(MockDateClient::default()));
        let token = client.login(valid()).await.unwrap();

        let premium = token.user.with_premium(true);
        client.update_profile(premium.clone()).await.unwrap();
        assert_eq!(client.current_user().await, Some(premium));
    }
}
