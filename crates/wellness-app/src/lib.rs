//! wellness-app - Feature reducers and effect runtime for Welltech
//!
//! This crate implements the reducer/effect pattern for the App and
//! Authentication features: pure update functions that return effect values,
//! a runner that interprets those effects against injected clients, and the
//! [`Store`] that ties them together. It also loads `.welltech/config.toml`.

pub mod actions;
pub mod config;
pub mod feature;
pub mod handler;
pub mod message;
pub mod process;
pub mod state;
pub mod store;
pub mod store_event;

// Re-export primary types
pub use actions::ActionSender;
pub use feature::{AppFeature, AuthFeature, Feature};
pub use handler::{AppEffect, AuthEffect, Report, UpdateResult};
pub use message::{AppAction, AppError, AuthAction, DemoUser};
pub use state::{AuthState, DemoState};
pub use store::{Store, StoreConfig};
pub use store_event::StoreEvent;

// Re-export client wiring for runners
pub use wellness_clients::{Dependencies, DependencyMode};
