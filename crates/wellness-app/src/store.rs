//! Store - owns a feature's state and runs its effects
//!
//! Update calls are serialized: one action at a time, follow-ups before the
//! next queued action. Effects run concurrently in a `JoinSet`, so every
//! effect (fire-and-forget reports included) can be awaited or aborted.
//! An effect that panics is replaced by its feature's failure response, so
//! loading flags never stay stuck.

use std::any::Any;
use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, warn};
use wellness_clients::Dependencies;

use crate::actions::ActionSender;
use crate::feature::Feature;
use crate::process;
use crate::store_event::StoreEvent;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Capacity of the action channel shared by effects
    pub channel_capacity: usize,
    /// How long `shutdown` waits for in-flight effects before aborting them
    pub shutdown_grace: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

pub struct Store<F: Feature> {
    state: F::State,
    deps: Dependencies,
    action_tx: mpsc::Sender<F::Action>,
    action_rx: mpsc::Receiver<F::Action>,
    effects: JoinSet<()>,
    /// Copy of each in-flight effect, for the panic fallback
    pending: HashMap<Id, F::Effect>,
    event_tx: broadcast::Sender<StoreEvent<F::State>>,
    shutdown_grace: Duration,
}

impl<F: Feature> Store<F> {
    pub fn new(initial: F::State, deps: Dependencies) -> Self {
        Self::with_config(initial, deps, StoreConfig::default())
    }

    pub fn with_config(initial: F::State, deps: Dependencies, config: StoreConfig) -> Self {
        let (action_tx, action_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (event_tx, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);

        Self {
            state: initial,
            deps,
            action_tx,
            action_rx,
            effects: JoinSet::new(),
            pending: HashMap::new(),
            event_tx,
            shutdown_grace: config.shutdown_grace,
        }
    }

    pub fn state(&self) -> &F::State {
        &self.state
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.deps
    }

    /// Number of effects not yet reaped
    pub fn in_flight(&self) -> usize {
        self.effects.len()
    }

    /// Subscribe to store events.
    ///
    /// Slow subscribers lose the oldest events (`RecvError::Lagged`).
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent<F::State>> {
        self.event_tx.subscribe()
    }

    /// Sender for producers outside the store, consumed by [`run`](Self::run)
    pub fn sender(&self) -> ActionSender<F::Action> {
        ActionSender::new(self.action_tx.clone())
    }

    /// Apply an action synchronously and spawn the effects it returns
    pub fn send(&mut self, action: F::Action) {
        let before = self.state.clone();
        let name = F::action_name(&action);

        let effects = &mut self.effects;
        let pending = &mut self.pending;
        let deps = &self.deps;
        let action_tx = &self.action_tx;
        // Effect payloads can carry passwords; only the action name is logged
        debug!("Applying {}", name);
        process::process_action::<F>(&mut self.state, action, |effect| {
            let kept = effect.clone();
            let handle = effects.spawn(F::run_effect(
                effect,
                deps.clone(),
                ActionSender::new(action_tx.clone()),
            ));
            pending.insert(handle.id(), kept);
        });

        if self.state != before && self.event_tx.receiver_count() > 0 {
            let _ = self.event_tx.send(StoreEvent::StateChanged {
                action: name,
                state: self.state.clone(),
            });
        }
    }

    /// Wait for the next action produced by an effect and apply it.
    ///
    /// Returns `None` once no effect is in flight and nothing is queued.
    pub async fn receive(&mut self) -> Option<F::Action> {
        loop {
            tokio::select! {
                biased;

                Some(action) = self.action_rx.recv() => {
                    self.send(action.clone());
                    return Some(action);
                }

                joined = self.effects.join_next_with_id() => match joined {
                    Some(joined) => {
                        if let Some(action) = reap::<F>(&self.event_tx, &mut self.pending, joined) {
                            self.send(action.clone());
                            return Some(action);
                        }
                    }
                    None => return None,
                },
            }
        }
    }

    /// Apply effect output until every effect has finished.
    ///
    /// Returns the number of actions received.
    pub async fn settle(&mut self) -> usize {
        let mut received = 0;
        while self.receive().await.is_some() {
            received += 1;
        }
        received
    }

    /// Apply actions from effects and [`sender`](Self::sender) until
    /// `shutdown_rx` turns true or its sender is dropped
    pub async fn run(&mut self, mut shutdown_rx: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }

                Some(action) = self.action_rx.recv() => self.send(action),

                Some(joined) = self.effects.join_next_with_id(), if !self.effects.is_empty() => {
                    if let Some(action) = reap::<F>(&self.event_tx, &mut self.pending, joined) {
                        self.send(action);
                    }
                }
            }
        }
    }

    /// Abort every in-flight effect and discard queued output
    pub fn cancel_effects(&mut self) {
        if !self.effects.is_empty() {
            debug!("Cancelling {} effects", self.effects.len());
        }
        self.effects.abort_all();
        self.pending.clear();
        while self.action_rx.try_recv().is_ok() {}
    }

    /// Tear the store down and return the final state.
    ///
    /// Effects get the configured grace period to finish; whatever they
    /// send is dropped. Stragglers are aborted.
    pub async fn shutdown(mut self) -> F::State {
        let _ = self.event_tx.send(StoreEvent::Shutdown);
        self.action_rx.close();

        let effects = &mut self.effects;
        let pending = &mut self.pending;
        let event_tx = &self.event_tx;
        // Fallback responses are dropped like any other late output
        let drained = tokio::time::timeout(self.shutdown_grace, async {
            while let Some(joined) = effects.join_next_with_id().await {
                reap::<F>(event_tx, pending, joined);
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                "{} effects still running after {:?}, aborting",
                self.effects.len(),
                self.shutdown_grace
            );
            self.effects.abort_all();
        }

        self.state
    }
}

/// Forget a finished effect; a panic yields the feature's failure response
fn reap<F: Feature>(
    event_tx: &broadcast::Sender<StoreEvent<F::State>>,
    pending: &mut HashMap<Id, F::Effect>,
    joined: Result<(Id, ()), JoinError>,
) -> Option<F::Action> {
    match joined {
        Ok((id, ())) => {
            pending.remove(&id);
            None
        }
        Err(e) if e.is_panic() => {
            let effect = pending.remove(&e.id());
            warn!("Effect panicked: {}", e);
            let _ = event_tx.send(StoreEvent::EffectFailed {
                message: e.to_string(),
            });
            let message = panic_message(e.into_panic());
            effect.and_then(|effect| F::effect_panicked(&effect, message))
        }
        Err(e) => {
            pending.remove(&e.id());
            debug!("Effect cancelled");
            None
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "effect panicked".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use mockall::mock;
    use wellness_clients::{
        AuthenticationClient, MockAnalyticsClient, MockAuthenticationClient, MockDateClient,
        MockLoggerClient,
    };
    use wellness_core::{AuthCredentials, AuthProvider, AuthToken, AuthenticationError, User};

    use super::*;
    use crate::feature::{AppFeature, AuthFeature};
    use crate::message::{AppAction, AuthAction};
    use crate::state::{AuthState, DemoState};

    mock! {
        pub Auth {}

        #[async_trait]
        impl AuthenticationClient for Auth {
            async fn login(&self, credentials: AuthCredentials) -> Result<AuthToken, AuthenticationError>;
            async fn login_with_social(&self, provider: AuthProvider, token: String) -> Result<AuthToken, AuthenticationError>;
            async fn logout(&self) -> Result<(), AuthenticationError>;
            async fn refresh_token(&self, refresh_token: String) -> Result<AuthToken, AuthenticationError>;
            async fn sign_up(&self, credentials: AuthCredentials, password: String) -> Result<User, AuthenticationError>;
            async fn reset_password(&self, email: String) -> Result<(), AuthenticationError>;
            async fn current_user(&self) -> Option<User>;
            async fn update_profile(&self, user: User) -> Result<User, AuthenticationError>;
            async fn delete_account(&self, password: String) -> Result<(), AuthenticationError>;
            async fn is_token_valid(&self) -> bool;
        }
    }

    fn credentials() -> AuthCredentials {
        AuthCredentials::new("test@example.com", "password")
    }

    #[tokio::test]
    async fn test_demo_login_round_trip() {
        let date = Arc::new(MockDateClient::default());
        let analytics = Arc::new(MockAnalyticsClient::new());
        let deps = Dependencies::mock()
            .with_date(date.clone())
            .with_analytics(analytics.clone());
        let mut store = Store::<AppFeature>::new(DemoState::new(), deps);

        store.send(AppAction::LoginButtonTapped);
        assert!(store.state().is_logging_in);

        let received = store.settle().await;

        assert_eq!(received, 1);
        assert!(store.state().is_logged_in);
        assert_eq!(store.state().user_name.as_deref(), Some("Demo User"));
        assert_eq!(date.sleeps(), vec![Duration::from_secs(2)]);
        assert_eq!(analytics.event_names(), vec!["login_completed"]);
        assert_eq!(analytics.user_id().as_deref(), Some("123"));
        assert_eq!(store.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_auth_login_publishes_state_changes() {
        let mut store = Store::<AuthFeature>::new(AuthState::new(), Dependencies::mock());
        let mut events = store.subscribe();

        store.send(AuthAction::Login(credentials()));
        let next = store.receive().await;
        assert!(matches!(next, Some(AuthAction::LoginResponse(Ok(_)))));
        store.settle().await;

        let state = store.state();
        assert!(state.is_authenticated());
        assert!(!state.is_loading);
        assert_eq!(
            state.refresh_token.as_deref(),
            Some(MockAuthenticationClient::REFRESH_TOKEN)
        );

        let first = events.recv().await.unwrap();
        assert!(matches!(
            first,
            StoreEvent::StateChanged { action: "login", ref state } if state.is_loading
        ));
        let second = events.recv().await.unwrap();
        assert_eq!(second.event_type(), "state_changed");
    }

    #[tokio::test]
    async fn test_client_failure_is_wrapped_and_logged() {
        let mut auth = MockAuth::new();
        auth.expect_login()
            .times(1)
            .returning(|_| Err(AuthenticationError::AccountLocked));
        let logger = Arc::new(MockLoggerClient::new());
        let deps = Dependencies::mock()
            .with_authentication(Arc::new(auth))
            .with_logger(logger.clone());
        let mut store = Store::<AuthFeature>::new(AuthState::new(), deps);

        store.send(AuthAction::Login(credentials()));
        store.settle().await;

        assert_eq!(
            store.state().login_error,
            Some(AuthenticationError::NetworkError("Account has been locked".into()))
        );
        assert!(!store.state().is_authenticated());
        assert_eq!(
            logger.messages(),
            vec![
                "Login failed: Account has been locked".to_string(),
                "Login failed: Network error: Account has been locked".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_logout_failure_still_signs_out() {
        let mut auth = MockAuth::new();
        auth.expect_logout()
            .returning(|| Err(AuthenticationError::UnknownError("offline".into())));
        let deps = Dependencies::mock().with_authentication(Arc::new(auth));
        let user = User::new("1", "a@b.co", "A", chrono::Utc::now());
        let mut store = Store::<AuthFeature>::new(AuthState::signed_in(user, "r"), deps);

        store.send(AuthAction::Logout);
        store.settle().await;

        assert!(!store.state().is_authenticated());
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn test_panicking_effect_is_reported() {
        let mut auth = MockAuth::new();
        auth.expect_current_user().returning(|| panic!("client exploded"));
        let deps = Dependencies::mock().with_authentication(Arc::new(auth));
        let mut store = Store::<AuthFeature>::new(AuthState::new(), deps);
        let mut events = store.subscribe();

        store.send(AuthAction::LoadCurrentUser);
        assert_eq!(store.settle().await, 1);

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type(), "effect_failed");
        assert!(store.state().current_user.is_none());
        assert_eq!(store.pending.len(), 0);
    }

    #[tokio::test]
    async fn test_panicking_login_clears_loading() {
        let mut auth = MockAuth::new();
        auth.expect_login().returning(|_| panic!("client exploded"));
        let logger = Arc::new(MockLoggerClient::new());
        let deps = Dependencies::mock()
            .with_authentication(Arc::new(auth))
            .with_logger(logger.clone());
        let mut store = Store::<AuthFeature>::new(AuthState::new(), deps);

        store.send(AuthAction::Login(credentials()));
        assert!(store.state().is_loading);
        assert_eq!(store.settle().await, 1);

        assert!(!store.state().is_loading);
        assert_eq!(
            store.state().login_error,
            Some(AuthenticationError::UnknownError("client exploded".into()))
        );
    }

    #[tokio::test]
    async fn test_demo_login_fallback_clears_logging_in() {
        let action = AppFeature::effect_panicked(
            &crate::handler::AppEffect::DemoLogin {
                delay: Duration::from_secs(2),
            },
            "boom".into(),
        );
        assert_eq!(
            action,
            Some(AppAction::LoginResponse(Err(
                crate::message::AppError::LoginFailed("boom".into())
            )))
        );

        let mut store = Store::<AppFeature>::new(DemoState::new(), Dependencies::mock());
        store.send(AppAction::LoginButtonTapped);
        store.cancel_effects();
        store.send(action.unwrap());
        assert!(!store.state().is_logging_in);
        assert!(!store.state().is_logged_in);
    }

    #[tokio::test]
    async fn test_cancel_effects_drops_pending_output() {
        let auth = MockAuthenticationClient::new().with_latency(Duration::from_secs(30));
        let deps = Dependencies::mock().with_authentication(Arc::new(auth));
        let mut store = Store::<AuthFeature>::new(AuthState::new(), deps);

        store.send(AuthAction::Login(credentials()));
        assert_eq!(store.in_flight(), 1);

        store.cancel_effects();

        assert_eq!(store.settle().await, 0);
        assert!(store.state().is_loading);
    }

    #[tokio::test]
    async fn test_shutdown_aborts_after_grace() {
        let auth = MockAuthenticationClient::new().with_latency(Duration::from_secs(30));
        let deps = Dependencies::mock().with_authentication(Arc::new(auth));
        let config = StoreConfig {
            shutdown_grace: Duration::from_millis(50),
            ..StoreConfig::default()
        };
        let mut store = Store::<AuthFeature>::with_config(AuthState::new(), deps, config);
        let mut events = store.subscribe();

        store.send(AuthAction::Login(credentials()));

        let state = tokio::time::timeout(Duration::from_secs(5), store.shutdown())
            .await
            .expect("shutdown should not wait for the effect");

        assert!(state.is_loading);
        assert!(!state.is_authenticated());
        assert!(matches!(events.recv().await.unwrap(), StoreEvent::StateChanged { .. }));
        assert!(matches!(events.recv().await.unwrap(), StoreEvent::Shutdown));
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_quick_effects() {
        let analytics = Arc::new(MockAnalyticsClient::new());
        let deps = Dependencies::mock().with_analytics(analytics.clone());
        let mut store = Store::<AppFeature>::new(DemoState::new(), deps);

        store.send(AppAction::AppLaunched);
        store.shutdown().await;

        assert_eq!(analytics.event_names(), vec!["app_launched"]);
    }

    #[tokio::test]
    async fn test_run_applies_external_actions_until_shutdown() {
        let mut store = Store::<AppFeature>::new(DemoState::new(), Dependencies::mock());
        let sender = store.sender();
        let mut events = store.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            store.run(shutdown_rx).await;
            store
        });

        assert!(sender.send(AppAction::LoginButtonTapped).await);
        // LoginButtonTapped, then LoginResponse from the effect
        for _ in 0..2 {
            events.recv().await.unwrap();
        }
        shutdown_tx.send(true).unwrap();

        let store = handle.await.unwrap();
        assert!(store.state().is_logged_in);
    }
}
