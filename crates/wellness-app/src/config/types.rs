//! Configuration types for `.welltech/config.toml`

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wellness_clients::{default_data_dir, AuthLatency, DependencyMode, LiveOptions};

use crate::store::{StoreConfig, DEFAULT_CHANNEL_CAPACITY};

/// Application settings (.welltech/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub dependencies: DependencySettings,

    #[serde(default)]
    pub latency: LatencySettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logger: LoggerSettings,
}

impl Settings {
    /// Options for building live clients
    pub fn live_options(&self) -> LiveOptions {
        LiveOptions {
            data_dir: self.storage.resolved_data_dir(),
            auth_latency: AuthLatency::from(&self.latency),
            network_timeout: Duration::from_millis(self.network.timeout_ms),
            user_agent: self.network.user_agent.clone(),
            log_history_limit: self.logger.history_limit,
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            channel_capacity: self.store.channel_capacity,
            shutdown_grace: Duration::from_millis(self.store.shutdown_grace_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DependencySettings {
    /// "live" or "mock"
    #[serde(default)]
    pub mode: DependencyMode,
}

/// Simulated round-trips of the live authentication client, in milliseconds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencySettings {
    pub login_ms: u64,
    pub social_login_ms: u64,
    pub logout_ms: u64,
    pub refresh_ms: u64,
    pub sign_up_ms: u64,
    pub reset_password_ms: u64,
    pub current_user_ms: u64,
    pub update_profile_ms: u64,
    pub delete_account_ms: u64,
    pub token_check_ms: u64,
}

impl Default for LatencySettings {
    fn default() -> Self {
        let d = AuthLatency::default();
        let ms = |duration: Duration| duration.as_millis() as u64;
        Self {
            login_ms: ms(d.login),
            social_login_ms: ms(d.social_login),
            logout_ms: ms(d.logout),
            refresh_ms: ms(d.refresh),
            sign_up_ms: ms(d.sign_up),
            reset_password_ms: ms(d.reset_password),
            current_user_ms: ms(d.current_user),
            update_profile_ms: ms(d.update_profile),
            delete_account_ms: ms(d.delete_account),
            token_check_ms: ms(d.token_check),
        }
    }
}

impl From<&LatencySettings> for AuthLatency {
    fn from(s: &LatencySettings) -> Self {
        AuthLatency {
            login: Duration::from_millis(s.login_ms),
            social_login: Duration::from_millis(s.social_login_ms),
            logout: Duration::from_millis(s.logout_ms),
            refresh: Duration::from_millis(s.refresh_ms),
            sign_up: Duration::from_millis(s.sign_up_ms),
            reset_password: Duration::from_millis(s.reset_password_ms),
            current_user: Duration::from_millis(s.current_user_ms),
            update_profile: Duration::from_millis(s.update_profile_ms),
            delete_account: Duration::from_millis(s.delete_account_ms),
            token_check: Duration::from_millis(s.token_check_ms),
        }
    }
}

/// Store settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreSettings {
    /// Capacity of the action channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Grace period for in-flight effects on shutdown
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_shutdown_grace_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NetworkSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("welltech/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Root of file-backed persistence; unset = `<data_local_dir>/welltech`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggerSettings {
    /// Entries kept by the live logger client
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    wellness_clients::logger::DEFAULT_HISTORY_LIMIT
}
