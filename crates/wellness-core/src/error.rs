//! Workspace error type with rich context
//!
//! Domain failures (`AuthenticationError`, `WorkoutError`, `PersistenceError`,
//! `ApiError`) stay typed in their own modules and are what reducers see. This
//! enum wraps them alongside infrastructure failures (I/O, serialization and
//! configuration) for the binary and the headless runner.

use thiserror::Error;

use crate::auth::AuthenticationError;
use crate::network::ApiError;
use crate::storage::PersistenceError;
use crate::workout::WorkoutError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Workspace error types organized by layer
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Domain Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthenticationError),

    #[error("Workout error: {0}")]
    Workout(#[from] WorkoutError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The environment failed rather than the request: retrying the same
    /// input will not help until storage, network or configuration is fixed.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Io(_)
            | Error::Json(_)
            | Error::Toml(_)
            | Error::Config { .. }
            | Error::Persistence(_)
            | Error::Api(_) => true,
            Error::Workout(e) => matches!(e, WorkoutError::NetworkError(_)),
            Error::Auth(e) => matches!(e, AuthenticationError::NetworkError(_)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions (for use with color-eyre)
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
