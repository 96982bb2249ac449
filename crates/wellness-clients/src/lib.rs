//! # wellness-clients - Capability Clients
//!
//! One trait per capability, each with a live and a mock implementation,
//! plus the [`Dependencies`] registry that bundles them for the store.
//!
//! Depends on [`wellness_core`] for domain types and errors.
//!
//! ## Public API
//!
//! ### Capabilities
//! - [`NetworkClient`] - HTTP requests and downloads (reqwest)
//! - [`PersistenceClient`] - keyed byte storage per [`wellness_core::StorageType`]
//! - [`AnalyticsClient`] - event tracking and user identification
//! - [`DateClient`] - clock, sleeping and calendar helpers
//! - [`LoggerClient`] - structured application log with history
//! - [`AuthenticationClient`] - sessions, sign-up and account management
//! - [`WorkoutClient`] - workout CRUD, stats and exercise search
//!
//! ### Wiring
//! - [`Dependencies`] - one `Arc<dyn ...>` per capability
//! - [`DependencyMode`], [`LiveOptions`] - choose and tune implementations

pub mod analytics;
pub mod auth;
pub mod date;
pub mod dependencies;
pub mod logger;
pub mod network;
pub mod persistence;
pub mod sync;
pub mod workout;

pub use analytics::{AnalyticsClient, LiveAnalyticsClient, MockAnalyticsClient};
pub use auth::{
    AuthLatency, AuthenticationClient, LiveAuthenticationClient, MockAuthenticationClient,
};
pub use date::{DateClient, LiveDateClient, MockDateClient};
pub use dependencies::{default_data_dir, Dependencies, DependencyMode, LiveOptions};
pub use logger::{LiveLoggerClient, LoggerClient, Metadata, MockLoggerClient};
pub use network::{LiveNetworkClient, MockNetworkClient, NetworkClient};
pub use persistence::{FilePersistenceClient, MockPersistenceClient, PersistenceClient};
pub use sync::Locked;
pub use workout::{LiveWorkoutClient, MockWorkoutClient, WorkoutClient, WorkoutStore};
