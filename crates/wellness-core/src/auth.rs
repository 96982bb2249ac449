//! Authentication domain types
//!
//! Users, credentials, session tokens, social providers and the closed
//! [`AuthenticationError`] taxonomy shared by the authentication client and
//! the authentication reducer.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Minimum accepted password length for sign-up
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Lifetime of a freshly issued session token
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// An authenticated identity. Replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<Url>,
    #[serde(default)]
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a non-premium user without an avatar
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            avatar_url: None,
            is_premium: false,
            created_at,
        }
    }

    pub fn with_avatar(mut self, avatar_url: Url) -> Self {
        self.avatar_url = Some(avatar_url);
        self
    }

    pub fn with_premium(mut self, is_premium: bool) -> Self {
        self.is_premium = is_premium;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Email/password pair submitted by the user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCredentials {
    pub email: String,
    pub password: String,
}

impl AuthCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validate a sign-up request before it reaches the backend.
    ///
    /// The email is checked first, so a request failing both rules reports
    /// [`AuthenticationError::InvalidEmail`].
    pub fn validate_sign_up(&self, password: &str) -> Result<(), AuthenticationError> {
        if !is_valid_email(&self.email) {
            return Err(AuthenticationError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthenticationError::WeakPassword);
        }
        Ok(())
    }

    /// Display name derived from the email's local part
    pub fn display_name(&self) -> String {
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "New User".to_string(),
        }
    }
}

// Passwords never reach log output.
impl fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Check an address against the sign-up email pattern
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Session token issued on login, social login, or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl AuthToken {
    /// Issue a token that expires [`TOKEN_LIFETIME_SECS`] after `issued_at`
    pub fn issue(
        token: impl Into<String>,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        user: User,
    ) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
            expires_at: issued_at + Duration::seconds(TOKEN_LIFETIME_SECS),
            user,
        }
    }

    /// Whether the token is still valid at the given instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whether the token is still valid right now
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Identity providers accepted for login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Apple,
    Google,
    Facebook,
    Twitter,
}

impl AuthProvider {
    pub const ALL: [AuthProvider; 5] = [
        AuthProvider::Email,
        AuthProvider::Apple,
        AuthProvider::Google,
        AuthProvider::Facebook,
        AuthProvider::Twitter,
    ];

    /// Wire identifier, also used in analytics and synthesized emails
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Apple => "apple",
            AuthProvider::Google => "google",
            AuthProvider::Facebook => "facebook",
            AuthProvider::Twitter => "twitter",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AuthProvider::Email => "Email",
            AuthProvider::Apple => "Apple",
            AuthProvider::Google => "Google",
            AuthProvider::Facebook => "Facebook",
            AuthProvider::Twitter => "Twitter",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthProvider {
    type Err = AuthenticationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuthProvider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AuthenticationError::SocialAuthError(format!("unknown provider: {s}")))
    }
}

/// Closed set of authentication failures. Equality compares tag and message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum AuthenticationError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication token has expired")]
    TokenExpired,

    #[error("Account has been locked")]
    AccountLocked,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password is too weak")]
    WeakPassword,

    #[error("Social authentication failed: {0}")]
    SocialAuthError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}
