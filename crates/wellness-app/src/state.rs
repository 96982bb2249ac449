//! Feature state (the Model)

use serde::Serialize;
use wellness_core::{AuthenticationError, User};

/// State of the demo application shell
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemoState {
    pub is_logging_in: bool,
    pub is_logged_in: bool,
    pub user_name: Option<String>,
}

impl DemoState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// State of the authentication feature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthState {
    pub current_user: Option<User>,
    pub is_loading: bool,
    pub login_error: Option<AuthenticationError>,
    pub sign_up_error: Option<AuthenticationError>,
    pub reset_password_error: Option<AuthenticationError>,
    pub update_profile_error: Option<AuthenticationError>,

    /// Refresh token of the current session; never serialized
    #[serde(skip)]
    pub refresh_token: Option<String>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `user` already signed in
    pub fn signed_in(user: User, refresh_token: impl Into<String>) -> Self {
        Self {
            current_user: Some(user),
            refresh_token: Some(refresh_token.into()),
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// True when any flow has an error to show
    pub fn has_error(&self) -> bool {
        self.login_error.is_some()
            || self.sign_up_error.is_some()
            || self.reset_password_error.is_some()
            || self.update_profile_error.is_some()
    }

    pub(crate) fn sign_out(&mut self) {
        self.current_user = None;
        self.refresh_token = None;
    }
}
