//! Handler module - feature update functions and effect descriptors
//!
//! Organized into submodules:
//! - `app`: update function of the demo application shell
//! - `auth`: update function of the authentication feature
//!
//! Update functions never perform I/O. Everything they want done is returned
//! as effect values that `actions` interprets against the injected clients.

pub(crate) mod app;
pub(crate) mod auth;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::time::Duration;

use wellness_core::{
    AnalyticsEvent, AnalyticsValue, AuthCredentials, AuthProvider, LogLevel, User, UserProperty,
};

use crate::message::{AppAction, AuthAction};

pub use app::update as update_app;
pub use auth::update as update_auth;

/// Category used by log lines of the application shell
pub const APP_CATEGORY: &str = "App";
/// Category used by log lines of the authentication feature
pub const AUTH_CATEGORY: &str = "Auth";

/// Client calls that produce no follow-up action.
///
/// A batch of reports runs in order on a single task.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Track an analytics event; the runner stamps it with the date client
    Track {
        name: String,
        parameters: BTreeMap<String, AnalyticsValue>,
    },
    SetUserId(Option<String>),
    SetUserProperty(UserProperty),
    ResetAnalytics,
    Log {
        level: LogLevel,
        category: &'static str,
        message: String,
    },
}

impl Report {
    pub fn track(event: AnalyticsEvent) -> Self {
        Report::Track {
            name: event.name,
            parameters: event.parameters,
        }
    }

    pub fn info(category: &'static str, message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, category, message)
    }

    pub fn warning(category: &'static str, message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warning, category, message)
    }

    pub fn error(category: &'static str, message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, category, message)
    }

    fn log(level: LogLevel, category: &'static str, message: impl Into<String>) -> Self {
        Report::Log {
            level,
            category,
            message: message.into(),
        }
    }
}

/// Work requested by the application shell
#[derive(Debug, Clone, PartialEq)]
pub enum AppEffect {
    Report(Vec<Report>),
    /// Wait on the date client, then resolve to the demo user
    DemoLogin { delay: Duration },
}

/// Work requested by the authentication feature
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEffect {
    Login(AuthCredentials),
    LoginWithSocial(AuthProvider, String),
    SignUp(AuthCredentials, String),
    Logout,
    RefreshToken(String),
    ResetPassword(String),
    UpdateProfile(User),
    DeleteAccount(String),
    LoadCurrentUser,
    Report(Vec<Report>),
}

/// Result of processing an action
#[derive(Debug, PartialEq)]
pub struct UpdateResult<A, E> {
    /// Optional follow-up action, processed before the next queued one
    pub message: Option<A>,
    /// Effects to spawn, one task each
    pub effects: Vec<E>,
}

impl<A, E> Default for UpdateResult<A, E> {
    fn default() -> Self {
        Self {
            message: None,
            effects: Vec::new(),
        }
    }
}

impl<A, E> UpdateResult<A, E> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: A) -> Self {
        Self {
            message: Some(msg),
            effects: Vec::new(),
        }
    }

    pub fn effect(effect: E) -> Self {
        Self {
            message: None,
            effects: vec![effect],
        }
    }

    pub fn effects(effects: Vec<E>) -> Self {
        Self {
            message: None,
            effects,
        }
    }
}

pub type AppUpdate = UpdateResult<AppAction, AppEffect>;
pub type AuthUpdate = UpdateResult<AuthAction, AuthEffect>;
