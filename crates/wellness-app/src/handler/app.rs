//! Update function of the demo application shell

use std::time::Duration;

use wellness_core::{AnalyticsEvent, UserProperty};

use super::{AppEffect, AppUpdate, Report, UpdateResult, APP_CATEGORY};
use crate::message::AppAction;
use crate::state::DemoState;

/// Simulated round-trip of the demo login
pub const DEMO_LOGIN_DELAY: Duration = Duration::from_secs(2);

pub fn update(state: &mut DemoState, action: AppAction) -> AppUpdate {
    match action {
        AppAction::AppLaunched => {
            UpdateResult::effect(AppEffect::Report(vec![Report::track(
                AnalyticsEvent::app_launched(),
            )]))
        }

        AppAction::LoginButtonTapped => {
            state.is_logging_in = true;
            UpdateResult::effects(vec![
                AppEffect::Report(vec![
                    Report::track(AnalyticsEvent::login("demo")),
                    Report::info(APP_CATEGORY, "Demo login started"),
                ]),
                AppEffect::DemoLogin {
                    delay: DEMO_LOGIN_DELAY,
                },
            ])
        }

        AppAction::LoginResponse(Ok(user)) => {
            state.is_logging_in = false;
            state.is_logged_in = true;
            state.user_name = Some(user.name.clone());
            UpdateResult::effect(AppEffect::Report(vec![
                Report::SetUserId(Some(user.id)),
                Report::SetUserProperty(UserProperty::has_completed_onboarding()),
                Report::info(
                    APP_CATEGORY,
                    format!("Demo login completed for user: {}", user.name),
                ),
            ]))
        }

        AppAction::LoginResponse(Err(e)) => {
            state.is_logging_in = false;
            UpdateResult::effect(AppEffect::Report(vec![Report::error(
                APP_CATEGORY,
                e.to_string(),
            )]))
        }

        AppAction::LogoutButtonTapped => {
            state.is_logged_in = false;
            state.user_name = None;
            UpdateResult::effect(AppEffect::Report(vec![
                Report::track(AnalyticsEvent::logout()),
                Report::ResetAnalytics,
                Report::info(APP_CATEGORY, "Demo logout completed"),
            ]))
        }
    }
}
