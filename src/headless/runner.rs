//! Headless runner - drives feature stores without any UI
//!
//! Each flow builds a [`Store`], forwards its events to stdout as NDJSON,
//! feeds it a scripted sequence of actions and waits for every effect to
//! settle before moving on. The store is shut down at the end so in-flight
//! effects get the configured grace period.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use wellness_app::{
    AppAction, AppFeature, AuthAction, AuthFeature, AuthState, DemoState, Dependencies, Feature,
    Store, StoreConfig, StoreEvent,
};
use wellness_core::prelude::*;
use wellness_core::{
    AnalyticsEvent, AuthCredentials, AuthProvider, ExerciseCategory, ExerciseSet, Exercise,
    WorkoutStats, WorkoutType,
};

use super::HeadlessEvent;

/// Feature label used in `state_changed` events of the demo shell
pub const APP_FEATURE: &str = "app";
/// Feature label used in `state_changed` events of authentication
pub const AUTH_FEATURE: &str = "auth";

/// Forward store events to stdout until the store shuts down
fn forward_events<S>(feature: &'static str, mut rx: broadcast::Receiver<StoreEvent<S>>) -> JoinHandle<()>
where
    S: Serialize + Clone + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(StoreEvent::Shutdown) | Err(RecvError::Closed) => break,
                Ok(event) => {
                    if let Some(headless) = HeadlessEvent::from_store(feature, &event) {
                        headless.emit();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Headless output lagged, {} events skipped", skipped);
                }
            }
        }
    })
}

/// Send each action, settling effects in between, and return the final state
pub async fn drive<F>(
    feature: &'static str,
    initial: F::State,
    deps: Dependencies,
    config: StoreConfig,
    actions: Vec<F::Action>,
) -> F::State
where
    F: Feature,
    F::State: Serialize,
{
    let mut store = Store::<F>::with_config(initial, deps, config);
    let forwarder = forward_events(feature, store.subscribe());

    for action in actions {
        info!("Headless {} action: {}", feature, F::action_name(&action));
        store.send(action);
        let received = store.settle().await;
        debug!("{} follow-up actions received", received);
    }

    let state = store.shutdown().await;
    if let Err(e) = forwarder.await {
        warn!("Headless event forwarder failed: {}", e);
    }
    state
}

/// Launch the demo shell, log in and log out again
pub async fn run_demo(deps: Dependencies, config: StoreConfig) -> DemoState {
    drive::<AppFeature>(
        APP_FEATURE,
        DemoState::new(),
        deps,
        config,
        vec![
            AppAction::AppLaunched,
            AppAction::LoginButtonTapped,
            AppAction::LogoutButtonTapped,
        ],
    )
    .await
}

/// Restore any stored session, then log in with email and password
pub async fn run_login(
    deps: Dependencies,
    config: StoreConfig,
    email: &str,
    password: &str,
) -> AuthState {
    let credentials = AuthCredentials::new(email, password);
    let state = drive::<AuthFeature>(
        AUTH_FEATURE,
        AuthState::new(),
        deps,
        config,
        vec![AuthAction::LoadCurrentUser, AuthAction::Login(credentials)],
    )
    .await;
    report_error(state.login_error.as_ref());
    state
}

/// Create an account; the password doubles as its confirmation
pub async fn run_sign_up(
    deps: Dependencies,
    config: StoreConfig,
    email: &str,
    password: &str,
) -> AuthState {
    let credentials = AuthCredentials::new(email, password);
    let state = drive::<AuthFeature>(
        AUTH_FEATURE,
        AuthState::new(),
        deps,
        config,
        vec![AuthAction::SignUp(credentials, password.to_string())],
    )
    .await;
    report_error(state.sign_up_error.as_ref());
    state
}

/// Log in through an identity provider, then refresh the session token
pub async fn run_social(
    deps: Dependencies,
    config: StoreConfig,
    provider: AuthProvider,
    token: &str,
) -> AuthState {
    let state = drive::<AuthFeature>(
        AUTH_FEATURE,
        AuthState::new(),
        deps,
        config,
        vec![
            AuthAction::LoginWithSocial(provider, token.to_string()),
            AuthAction::RefreshToken,
        ],
    )
    .await;
    report_error(state.login_error.as_ref());
    state
}

fn report_error(error: Option<&impl std::fmt::Display>) {
    if let Some(e) = error {
        HeadlessEvent::error(e.to_string(), false).emit();
    }
}

/// Record a short strength session and print this week's stats
pub async fn run_workouts(deps: &Dependencies) -> Result<WorkoutStats> {
    let client = &deps.workout;
    let date = &deps.date;

    let workout = client
        .create_workout(WorkoutType::Weightlifting)
        .await
        .context("Failed to create workout")?;
    deps.analytics
        .track(stamped(AnalyticsEvent::workout_started(workout.workout_type.as_str()), deps))
        .await;
    HeadlessEvent::workout_updated("created", workout.clone()).emit();

    let exercise = client
        .search_exercises("squat")
        .await
        .into_iter()
        .next()
        .unwrap_or_else(|| Exercise::new("Squats", ExerciseCategory::Strength, date.now()));
    let exercise = client
        .add_exercise(workout.id, exercise)
        .await
        .context("Failed to add exercise")?;

    for (reps, weight_kg) in [(10, 60.0), (8, 70.0), (6, 80.0)] {
        let set = ExerciseSet::strength(reps, Some(weight_kg), date.now());
        client
            .add_set(workout.id, exercise.id, set)
            .await
            .context("Failed to add set")?;
    }

    let finished = client
        .finish_workout(workout.id, date.now())
        .await
        .context("Failed to finish workout")?;
    deps.analytics
        .track(stamped(
            AnalyticsEvent::workout_completed(
                finished.workout_type.as_str(),
                finished.duration().unwrap_or_default(),
            ),
            deps,
        ))
        .await;
    HeadlessEvent::workout_updated("finished", finished).emit();

    let now = date.now();
    let stats = client.workout_stats(date.start_of_week(now), date.end_of_day()).await;
    HeadlessEvent::stats(stats.clone()).emit();
    Ok(stats)
}

fn stamped(mut event: AnalyticsEvent, deps: &Dependencies) -> AnalyticsEvent {
    event.timestamp = deps.date.now();
    event
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use wellness_clients::{MockAnalyticsClient, MockWorkoutClient};

    #[tokio::test]
    async fn test_demo_ends_logged_out() {
        let analytics = Arc::new(MockAnalyticsClient::new());
        let deps = Dependencies::mock().with_analytics(analytics.clone());

        let state = run_demo(deps, StoreConfig::default()).await;

        assert_eq!(state, DemoState::new());
        assert_eq!(
            analytics.event_names(),
            vec!["app_launched", "login_completed", "logout_completed"]
        );
    }

    #[tokio::test]
    async fn test_login_with_known_account() {
        let state = run_login(
            Dependencies::mock(),
            StoreConfig::default(),
            "test@example.com",
            "password",
        )
        .await;

        assert!(state.is_authenticated());
        assert_eq!(state.login_error, None);
    }

    #[tokio::test]
    async fn test_sign_up_with_weak_password() {
        let state = run_sign_up(
            Dependencies::mock(),
            StoreConfig::default(),
            "new@example.com",
            "short",
        )
        .await;

        assert!(!state.is_authenticated());
        assert_eq!(
            state.sign_up_error,
            Some(wellness_core::AuthenticationError::WeakPassword)
        );
    }

    #[tokio::test]
    async fn test_social_login_refreshes_session() {
        let state = run_social(
            Dependencies::mock(),
            StoreConfig::default(),
            AuthProvider::Google,
            "google-token",
        )
        .await;

        assert!(state.is_authenticated());
        assert_eq!(state.refresh_token.as_deref(), Some("new_refresh_token"));
    }

    #[tokio::test]
    async fn test_workouts_flow_records_stats() {
        let analytics = Arc::new(MockAnalyticsClient::new());
        let deps = Dependencies::mock().with_analytics(analytics.clone());

        let stats = run_workouts(&deps).await.unwrap();

        assert_eq!(stats.total_workouts, 1);
        assert_eq!(
            analytics.event_names(),
            vec!["workout_started", "workout_completed"]
        );
        assert_eq!(deps.workout.all_workouts().await.len(), 1);
        let workout = &deps.workout.all_workouts().await[0];
        assert_eq!(workout.exercises[0].sets.len(), 3);
        assert!(!workout.is_active());
    }

    #[tokio::test]
    async fn test_workouts_uses_injected_client() {
        let workouts = Arc::new(MockWorkoutClient::new(Arc::new(
            wellness_clients::MockDateClient::default(),
        )));
        let deps = Dependencies::mock().with_workout(workouts.clone());

        run_workouts(&deps).await.unwrap();

        assert_eq!(workouts.save_count(), 6);
    }

    #[tokio::test]
    async fn test_workouts_storage_failure_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let deps = Dependencies::live(wellness_clients::LiveOptions {
            data_dir: blocker,
            ..wellness_clients::LiveOptions::default()
        })
        .unwrap();

        let err = run_workouts(&deps).await.unwrap_err();

        assert!(matches!(err, Error::Workout(_)));
        assert!(err.is_fatal());
    }
}
