//! Welltech Library
//!
//! Headless driver for the wellness core: wires configuration and
//! dependencies into feature stores and reports everything as NDJSON.

pub mod headless;

pub use headless::runner::{run_demo, run_login, run_sign_up, run_social, run_workouts};
pub use headless::HeadlessEvent;
