//! Dependency registry handed to the store at construction

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wellness_core::ApiError;

use crate::analytics::{AnalyticsClient, LiveAnalyticsClient, MockAnalyticsClient};
use crate::auth::{
    AuthLatency, AuthenticationClient, LiveAuthenticationClient, MockAuthenticationClient,
};
use crate::date::{DateClient, LiveDateClient, MockDateClient};
use crate::logger::{LiveLoggerClient, LoggerClient, MockLoggerClient, DEFAULT_HISTORY_LIMIT};
use crate::network::{LiveNetworkClient, MockNetworkClient, NetworkClient};
use crate::persistence::{FilePersistenceClient, MockPersistenceClient, PersistenceClient};
use crate::workout::{LiveWorkoutClient, MockWorkoutClient, WorkoutClient};

/// Which family of implementations to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyMode {
    #[default]
    Live,
    Mock,
}

impl DependencyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyMode::Live => "live",
            DependencyMode::Mock => "mock",
        }
    }
}

impl fmt::Display for DependencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(DependencyMode::Live),
            "mock" => Ok(DependencyMode::Mock),
            other => Err(format!("unknown dependency mode: {other}")),
        }
    }
}

/// Knobs for the live implementations
#[derive(Debug, Clone)]
pub struct LiveOptions {
    /// Root of file-backed persistence
    pub data_dir: PathBuf,
    pub auth_latency: AuthLatency,
    pub network_timeout: Duration,
    pub user_agent: String,
    pub log_history_limit: usize,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            auth_latency: AuthLatency::default(),
            network_timeout: Duration::from_secs(30),
            user_agent: format!("welltech/{}", env!("CARGO_PKG_VERSION")),
            log_history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// `<data_local_dir>/welltech`, or `./.welltech-data` when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("welltech"))
        .unwrap_or_else(|| PathBuf::from(".welltech-data"))
}

/// How the clients that sit on top of `date` and `persistence` were built
#[derive(Debug, Clone, Copy)]
enum Wiring {
    Live(AuthLatency),
    Mock,
}

/// One implementation per capability.
///
/// Cheap to clone; every field is shared. Tests start from [`mock`] and
/// swap individual clients with the `with_*` methods. Swapping `date` or
/// `persistence` rebuilds the workout and authentication clients that read
/// them, unless those were swapped themselves.
///
/// [`mock`]: Dependencies::mock
#[derive(Clone)]
pub struct Dependencies {
    pub network: Arc<dyn NetworkClient>,
    pub persistence: Arc<dyn PersistenceClient>,
    pub analytics: Arc<dyn AnalyticsClient>,
    pub date: Arc<dyn DateClient>,
    pub logger: Arc<dyn LoggerClient>,
    pub authentication: Arc<dyn AuthenticationClient>,
    pub workout: Arc<dyn WorkoutClient>,
    wiring: Wiring,
    workout_overridden: bool,
    authentication_overridden: bool,
}

impl Dependencies {
    pub fn live(options: LiveOptions) -> Result<Self, ApiError> {
        let date: Arc<dyn DateClient> = Arc::new(LiveDateClient);
        let persistence: Arc<dyn PersistenceClient> =
            Arc::new(FilePersistenceClient::new(options.data_dir.clone()));
        let wiring = Wiring::Live(options.auth_latency);

        tracing::debug!(
            "Building live dependencies (data dir {})",
            options.data_dir.display()
        );

        Ok(Self {
            network: Arc::new(LiveNetworkClient::new(
                options.network_timeout,
                &options.user_agent,
            )?),
            analytics: Arc::new(LiveAnalyticsClient::new()),
            logger: Arc::new(LiveLoggerClient::new(options.log_history_limit)),
            authentication: build_authentication(wiring, &persistence, &date),
            workout: build_workout(wiring, &persistence, &date),
            persistence,
            date,
            wiring,
            workout_overridden: false,
            authentication_overridden: false,
        })
    }

    /// In-memory implementations with no latency and no I/O
    pub fn mock() -> Self {
        let date: Arc<dyn DateClient> = Arc::new(MockDateClient::default());
        let persistence: Arc<dyn PersistenceClient> = Arc::new(MockPersistenceClient::new());
        let wiring = Wiring::Mock;
        Self {
            network: Arc::new(MockNetworkClient::new()),
            analytics: Arc::new(MockAnalyticsClient::new()),
            logger: Arc::new(MockLoggerClient::new()),
            authentication: build_authentication(wiring, &persistence, &date),
            workout: build_workout(wiring, &persistence, &date),
            persistence,
            date,
            wiring,
            workout_overridden: false,
            authentication_overridden: false,
        }
    }

    pub fn for_mode(mode: DependencyMode, options: LiveOptions) -> Result<Self, ApiError> {
        match mode {
            DependencyMode::Live => Self::live(options),
            DependencyMode::Mock => Ok(Self::mock()),
        }
    }

    /// Rebuild the clients derived from `date` and `persistence`
    fn rewire(mut self) -> Self {
        if !self.workout_overridden {
            self.workout = build_workout(self.wiring, &self.persistence, &self.date);
        }
        if !self.authentication_overridden {
            self.authentication = build_authentication(self.wiring, &self.persistence, &self.date);
        }
        self
    }

    pub fn with_network(mut self, client: Arc<dyn NetworkClient>) -> Self {
        self.network = client;
        self
    }

    pub fn with_persistence(mut self, client: Arc<dyn PersistenceClient>) -> Self {
        self.persistence = client;
        self.rewire()
    }

    pub fn with_analytics(mut self, client: Arc<dyn AnalyticsClient>) -> Self {
        self.analytics = client;
        self
    }

    pub fn with_date(mut self, client: Arc<dyn DateClient>) -> Self {
        self.date = client;
        self.rewire()
    }

    pub fn with_logger(mut self, client: Arc<dyn LoggerClient>) -> Self {
        self.logger = client;
        self
    }

    pub fn with_authentication(mut self, client: Arc<dyn AuthenticationClient>) -> Self {
        self.authentication = client;
        self.authentication_overridden = true;
        self
    }

    pub fn with_workout(mut self, client: Arc<dyn WorkoutClient>) -> Self {
        self.workout = client;
        self.workout_overridden = true;
        self
    }
}

fn build_workout(
    wiring: Wiring,
    persistence: &Arc<dyn PersistenceClient>,
    date: &Arc<dyn DateClient>,
) -> Arc<dyn WorkoutClient> {
    match wiring {
        Wiring::Live(_) => Arc::new(LiveWorkoutClient::new(persistence.clone(), date.clone())),
        Wiring::Mock => Arc::new(MockWorkoutClient::new(date.clone())),
    }
}

fn build_authentication(
    wiring: Wiring,
    persistence: &Arc<dyn PersistenceClient>,
    date: &Arc<dyn DateClient>,
) -> Arc<dyn AuthenticationClient> {
    match wiring {
        Wiring::Live(latency) => Arc::new(LiveAuthenticationClient::new(
            persistence.clone(),
            date.clone(),
            latency,
        )),
        Wiring::Mock => Arc::new(MockAuthenticationClient::new()),
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies").finish_non_exhaustive()
    }
}
