//! Action types for the features

use serde::Serialize;
use thiserror::Error;
use wellness_core::{AuthCredentials, AuthProvider, AuthToken, AuthenticationError, User};

/// Signed-in identity in the demo shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl DemoUser {
    /// The account the demo login resolves to
    pub fn demo() -> Self {
        Self {
            id: "123".to_string(),
            name: "Demo User".to_string(),
            email: "demo@welltech.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Login failed: {0}")]
    LoginFailed(String),
}

/// All actions of the demo application shell
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    AppLaunched,
    LoginButtonTapped,
    LogoutButtonTapped,
    LoginResponse(Result<DemoUser, AppError>),
}

/// All actions of the authentication feature
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    // ─────────────────────────────────────────────────────────
    // Sign-in
    // ─────────────────────────────────────────────────────────
    Login(AuthCredentials),
    /// Provider plus the provider-issued token
    LoginWithSocial(AuthProvider, String),
    LoginResponse(Result<AuthToken, AuthenticationError>),

    /// Credentials plus the password confirmation
    SignUp(AuthCredentials, String),
    SignUpResponse(Result<User, AuthenticationError>),

    // ─────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────
    Logout,
    LogoutResponse,
    RefreshToken,
    RefreshTokenResponse(Result<AuthToken, AuthenticationError>),
    LoadCurrentUser,
    LoadCurrentUserResponse(Option<User>),

    // ─────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────
    ResetPassword(String),
    ResetPasswordResponse(Result<(), AuthenticationError>),
    UpdateProfile(User),
    UpdateProfileResponse(Result<User, AuthenticationError>),
    /// Password confirmation
    DeleteAccount(String),
    DeleteAccountResponse(Result<(), AuthenticationError>),

    ClearErrors,
}

impl AuthAction {
    /// Short variant name for logs and NDJSON output
    pub fn name(&self) -> &'static str {
        match self {
            AuthAction::Login(_) => "login",
            AuthAction::LoginWithSocial(..) => "login_with_social",
            AuthAction::LoginResponse(_) => "login_response",
            AuthAction::SignUp(..) => "sign_up",
            AuthAction::SignUpResponse(_) => "sign_up_response",
            AuthAction::Logout => "logout",
            AuthAction::LogoutResponse => "logout_response",
            AuthAction::RefreshToken => "refresh_token",
            AuthAction::RefreshTokenResponse(_) => "refresh_token_response",
            AuthAction::LoadCurrentUser => "load_current_user",
            AuthAction::LoadCurrentUserResponse(_) => "load_current_user_response",
            AuthAction::ResetPassword(_) => "reset_password",
            AuthAction::ResetPasswordResponse(_) => "reset_password_response",
            AuthAction::UpdateProfile(_) => "update_profile",
            AuthAction::UpdateProfileResponse(_) => "update_profile_response",
            AuthAction::DeleteAccount(_) => "delete_account",
            AuthAction::DeleteAccountResponse(_) => "delete_account_response",
            AuthAction::ClearErrors => "clear_errors",
        }
    }
}

impl AppAction {
    pub fn name(&self) -> &'static str {
        match self {
            AppAction::AppLaunched => "app_launched",
            AppAction::LoginButtonTapped => "login_button_tapped",
            AppAction::LogoutButtonTapped => "logout_button_tapped",
            AppAction::LoginResponse(_) => "login_response",
        }
    }
}
