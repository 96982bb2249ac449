//! Analytics vocabulary: events, parameter values and user properties

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single analytics parameter value.
///
/// Serialized untagged so the JSON form is the bare value (`"email"`, `42`,
/// `2.5`, `true`, `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyticsValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl From<&str> for AnalyticsValue {
    fn from(value: &str) -> Self {
        AnalyticsValue::String(value.to_string())
    }
}

impl From<String> for AnalyticsValue {
    fn from(value: String) -> Self {
        AnalyticsValue::String(value)
    }
}

impl From<i64> for AnalyticsValue {
    fn from(value: i64) -> Self {
        AnalyticsValue::Int(value)
    }
}

impl From<f64> for AnalyticsValue {
    fn from(value: f64) -> Self {
        AnalyticsValue::Double(value)
    }
}

impl From<bool> for AnalyticsValue {
    fn from(value: bool) -> Self {
        AnalyticsValue::Bool(value)
    }
}

impl<T: Into<AnalyticsValue>> From<Option<T>> for AnalyticsValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AnalyticsValue::Null, Into::into)
    }
}

/// A named analytics event with snake_case parameter keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, AnalyticsValue>,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Create an event without parameters, stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Add a parameter (builder style)
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<AnalyticsValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&AnalyticsValue> {
        self.parameters.get(key)
    }

    // ── Common events ─────────────────────────────────────────────────────

    pub fn app_launched() -> Self {
        Self::new("app_launched")
    }

    pub fn app_backgrounded() -> Self {
        Self::new("app_backgrounded")
    }

    pub fn app_foregrounded() -> Self {
        Self::new("app_foregrounded")
    }

    pub fn login(method: &str) -> Self {
        Self::new("login_completed").with_param("method", method)
    }

    pub fn logout() -> Self {
        Self::new("logout_completed")
    }

    pub fn workout_started(workout_type: &str) -> Self {
        Self::new("workout_started").with_param("workout_type", workout_type)
    }

    pub fn workout_completed(workout_type: &str, duration_secs: f64) -> Self {
        Self::new("workout_completed")
            .with_param("workout_type", workout_type)
            .with_param("duration_seconds", duration_secs)
    }

    pub fn screen_view(screen_name: &str) -> Self {
        Self::new("screen_view").with_param("screen_name", screen_name)
    }
}

/// A key/value property attached to the current analytics user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProperty {
    pub key: String,
    pub value: AnalyticsValue,
}

impl UserProperty {
    pub fn new(key: impl Into<String>, value: impl Into<AnalyticsValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_premium_user() -> Self {
        Self::new("is_premium_user", false)
    }

    pub fn has_completed_onboarding() -> Self {
        Self::new("has_completed_onboarding", false)
    }

    pub fn workout_count(count: i64) -> Self {
        Self::new("workout_count", count)
    }

    pub fn total_workout_time(secs: f64) -> Self {
        Self::new("total_workout_time_seconds", secs)
    }
}
