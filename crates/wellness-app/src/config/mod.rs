//! Configuration file parsing for Welltech
//!
//! Supports `.welltech/config.toml`, resolved against a base directory
//! (the working directory unless `--config-dir` is given).

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings, parse_settings, MODE_ENV_VAR};
pub use types::*;
