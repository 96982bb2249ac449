//! Headless mode - NDJSON event output for scripted runs
//!
//! Every flow the `welltech` binary drives reports through [`HeadlessEvent`]s
//! written to stdout, one JSON object per line. Diagnostics go to the log
//! file, so stdout stays machine-readable.
//!
//! # Example Output
//!
//! ```json
//! {"event":"started","command":"login","mode":"mock","timestamp":1704700001000}
//! {"event":"state_changed","feature":"auth","action":"login","state":{"is_loading":true,...},"timestamp":1704700001002}
//! {"event":"finished","command":"login","success":true,"timestamp":1704700001010}
//! ```

pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;
use wellness_app::{DependencyMode, StoreEvent};
use wellness_core::{Workout, WorkoutStats};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// A flow is about to run
    Started {
        command: String,
        mode: DependencyMode,
        timestamp: i64,
    },

    /// A store applied an action that changed its state
    StateChanged {
        feature: &'static str,
        action: &'static str,
        state: serde_json::Value,
        timestamp: i64,
    },

    /// An effect task panicked
    EffectFailed {
        feature: &'static str,
        message: String,
        timestamp: i64,
    },

    /// A workout was written by the workout client
    WorkoutUpdated {
        step: &'static str,
        workout: Workout,
        timestamp: i64,
    },

    /// Aggregates over a date range
    Stats { stats: WorkoutStats, timestamp: i64 },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    /// The flow completed
    Finished {
        command: String,
        success: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn started(command: &str, mode: DependencyMode) -> Self {
        Self::Started {
            command: command.to_string(),
            mode,
            timestamp: Self::now(),
        }
    }

    /// Translate a store event; `None` for events with no output
    pub fn from_store<S: Serialize>(feature: &'static str, event: &StoreEvent<S>) -> Option<Self> {
        match event {
            StoreEvent::StateChanged { action, state } => {
                let state = match serde_json::to_value(state) {
                    Ok(value) => value,
                    Err(e) => {
                        error!("Failed to serialize {} state: {}", feature, e);
                        serde_json::Value::Null
                    }
                };
                Some(Self::StateChanged {
                    feature,
                    action: *action,
                    state,
                    timestamp: Self::now(),
                })
            }
            StoreEvent::EffectFailed { message } => Some(Self::EffectFailed {
                feature,
                message: message.clone(),
                timestamp: Self::now(),
            }),
            StoreEvent::Shutdown => None,
        }
    }

    pub fn workout_updated(step: &'static str, workout: Workout) -> Self {
        Self::WorkoutUpdated {
            step,
            workout,
            timestamp: Self::now(),
        }
    }

    pub fn stats(stats: WorkoutStats) -> Self {
        Self::Stats {
            stats,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }

    pub fn finished(command: &str, success: bool) -> Self {
        Self::Finished {
            command: command.to_string(),
            success,
            timestamp: Self::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellness_app::DemoState;
    use wellness_core::WorkoutType;

    fn to_value(event: &HeadlessEvent) -> serde_json::Value {
        let json = serde_json::to_string(event).expect("serialization failed");
        serde_json::from_str(&json).expect("invalid JSON")
    }

    #[test]
    fn test_started_serialization() {
        let value = to_value(&HeadlessEvent::started("demo", DependencyMode::Mock));

        assert_eq!(value["event"], "started");
        assert_eq!(value["command"], "demo");
        assert_eq!(value["mode"], "mock");
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_state_changed_from_store() {
        let state = DemoState {
            is_logging_in: true,
            ..DemoState::default()
        };
        let event = StoreEvent::StateChanged {
            action: "login_button_tapped",
            state,
        };

        let value = to_value(&HeadlessEvent::from_store("app", &event).unwrap());

        assert_eq!(value["event"], "state_changed");
        assert_eq!(value["feature"], "app");
        assert_eq!(value["action"], "login_button_tapped");
        assert_eq!(value["state"]["is_logging_in"], true);
        assert_eq!(value["state"]["user_name"], serde_json::Value::Null);
    }

    #[test]
    fn test_shutdown_has_no_output() {
        let event: StoreEvent<DemoState> = StoreEvent::Shutdown;
        assert!(HeadlessEvent::from_store("app", &event).is_none());
    }

    #[test]
    fn test_effect_failed_serialization() {
        let event: StoreEvent<DemoState> = StoreEvent::EffectFailed {
            message: "task panicked".into(),
        };
        let value = to_value(&HeadlessEvent::from_store("auth", &event).unwrap());

        assert_eq!(value["event"], "effect_failed");
        assert_eq!(value["message"], "task panicked");
    }

    #[test]
    fn test_workout_updated_serialization() {
        let workout = Workout::start(WorkoutType::Running, Utc::now());
        let value = to_value(&HeadlessEvent::workout_updated("created", workout.clone()));

        assert_eq!(value["event"], "workout_updated");
        assert_eq!(value["step"], "created");
        assert_eq!(value["workout"]["id"], workout.id.to_string());
        assert_eq!(value["workout"]["end_time"], serde_json::Value::Null);
    }

    #[test]
    fn test_stats_serialization() {
        let value = to_value(&HeadlessEvent::stats(WorkoutStats::default()));

        assert_eq!(value["event"], "stats");
        assert_eq!(value["stats"]["total_workouts"], 0);
    }

    #[test]
    fn test_finished_serialization() {
        let value = to_value(&HeadlessEvent::finished("signup", false));

        assert_eq!(value["event"], "finished");
        assert_eq!(value["success"], false);
    }
}
