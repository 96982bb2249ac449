//! # wellness-core - Core Domain Types
//!
//! Foundation crate for Welltech. Provides the domain vocabulary shared by the
//! clients and the feature reducers, plus error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, regex, tracing, uuid, url).
//!
//! ## Public API
//!
//! ### Authentication (`auth`)
//! - [`User`], [`AuthCredentials`], [`AuthToken`], [`AuthProvider`]
//! - [`AuthenticationError`] - Closed set of authentication failures
//!
//! ### Workouts (`workout`, `stats`, `catalog`)
//! - [`Workout`], [`Exercise`], [`ExerciseSet`] - Aggregates with derived metrics
//! - [`WorkoutStats`], [`PersonalRecord`] - Aggregation over a date range
//! - [`WorkoutError`] - Workout domain failures
//!
//! ### Observability vocabulary (`analytics`, `log_entry`)
//! - [`AnalyticsEvent`], [`AnalyticsValue`], [`UserProperty`]
//! - [`LogEntry`], [`LogLevel`]
//!
//! ### Transport (`network`, `storage`)
//! - [`ApiRequest`], [`ApiResponse`], [`ApiError`], [`HttpMethod`]
//! - [`StorageType`], [`PersistenceError`]
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Workspace error enum; `is_fatal` separates environment failures
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use wellness_core::prelude::*;
//! ```

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod log_entry;
pub mod logging;
pub mod network;
pub mod prelude;
pub mod stats;
pub mod storage;
pub mod workout;

// Re-export commonly used types at crate root for convenience
pub use analytics::{AnalyticsEvent, AnalyticsValue, UserProperty};
pub use auth::{
    is_valid_email, AuthCredentials, AuthProvider, AuthToken, AuthenticationError, User,
    MIN_PASSWORD_LENGTH, TOKEN_LIFETIME_SECS,
};
pub use error::{Error, Result, ResultExt};
pub use log_entry::{LogEntry, LogLevel};
pub use network::{ApiError, ApiRequest, ApiResponse, HttpMethod};
pub use stats::{PersonalRecord, RecordType, WorkoutStats};
pub use storage::{PersistenceError, StorageType};
pub use workout::{Exercise, ExerciseCategory, ExerciseSet, Workout, WorkoutError, WorkoutType};
