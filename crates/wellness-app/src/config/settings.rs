//! Settings loader for .welltech/config.toml

use std::path::{Path, PathBuf};

use wellness_clients::DependencyMode;
use wellness_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
const WELLTECH_DIR: &str = ".welltech";

/// Environment variable overriding `[dependencies] mode`
pub const MODE_ENV_VAR: &str = "WELLTECH_MODE";

pub fn config_path(base: &Path) -> PathBuf {
    base.join(WELLTECH_DIR).join(CONFIG_FILENAME)
}

/// Load settings from .welltech/config.toml under `base`
///
/// Returns default settings if the file doesn't exist or can't be parsed.
/// `WELLTECH_MODE` takes precedence over the file's dependency mode.
pub fn load_settings(base: &Path) -> Settings {
    let mut settings = read_settings(base);
    apply_env_overrides(&mut settings);
    settings
}

fn read_settings(base: &Path) -> Settings {
    let path = config_path(base);

    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return Settings::default();
    }

    match parse_settings(&path) {
        Ok(settings) => {
            debug!("Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!("Ignoring {:?}: {}", path, e);
            Settings::default()
        }
    }
}

/// Parse a settings file, reporting read and TOML errors
pub fn parse_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn apply_env_overrides(settings: &mut Settings) {
    let Ok(value) = std::env::var(MODE_ENV_VAR) else {
        return;
    };
    match value.parse::<DependencyMode>() {
        Ok(mode) => {
            debug!("{} overrides dependency mode to {}", MODE_ENV_VAR, mode);
            settings.dependencies.mode = mode;
        }
        Err(e) => warn!("Ignoring {}: {}", MODE_ENV_VAR, e),
    }
}

/// Create .welltech/config.toml with commented defaults if missing.
///
/// Returns the path of the config file.
pub fn init_config_dir(base: &Path) -> Result<PathBuf> {
    let dir = base.join(WELLTECH_DIR);

    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::config(format!("Failed to create .welltech dir: {}", e)))?;
    }

    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        std::fs::write(&path, generate_default_config())
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Wrote default config to {:?}", path);
    }

    Ok(path)
}

fn generate_default_config() -> String {
    format!(
        r#"# Welltech Configuration

[dependencies]
mode = "live"           # "live" or "mock"; WELLTECH_MODE overrides

[latency]
# Simulated round-trips of the live authentication client (ms)
login_ms = 1000
social_login_ms = 1000
logout_ms = 500
refresh_ms = 500
sign_up_ms = 1000
reset_password_ms = 1000
current_user_ms = 500
update_profile_ms = 1000
delete_account_ms = 2000
token_check_ms = 200

[store]
channel_capacity = 256
shutdown_grace_ms = 2000  # Wait for in-flight effects before aborting

[network]
timeout_ms = 30000
user_agent = "welltech/{version}"

[storage]
# data_dir = "/path/to/data"   # Default: <data_local_dir>/welltech

[logger]
history_limit = 1000
"#,
        version = env!("CARGO_PKG_VERSION")
    )
}
