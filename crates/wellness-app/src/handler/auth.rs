//! Update function of the authentication feature

use wellness_core::{AnalyticsEvent, AuthProvider, AuthenticationError};

use super::{AuthEffect, AuthUpdate, Report, UpdateResult, AUTH_CATEGORY};
use crate::message::AuthAction;
use crate::state::AuthState;

fn reports(reports: Vec<Report>) -> AuthUpdate {
    UpdateResult::effect(AuthEffect::Report(reports))
}

fn failure_event(name: &str, error: &AuthenticationError) -> Report {
    Report::track(AnalyticsEvent::new(name).with_param("error", error.to_string()))
}

pub fn update(state: &mut AuthState, action: AuthAction) -> AuthUpdate {
    match action {
        // ─────────────────────────────────────────────────────────
        // Sign-in
        // ─────────────────────────────────────────────────────────
        AuthAction::Login(credentials) => {
            state.is_loading = true;
            state.login_error = None;
            UpdateResult::effect(AuthEffect::Login(credentials))
        }

        AuthAction::LoginWithSocial(provider, token) => {
            state.is_loading = true;
            state.login_error = None;
            UpdateResult::effect(AuthEffect::LoginWithSocial(provider, token))
        }

        AuthAction::LoginResponse(Ok(token)) => {
            state.is_loading = false;
            state.login_error = None;
            state.refresh_token = Some(token.refresh_token);
            let user = token.user;
            let report = vec![
                Report::SetUserId(Some(user.id.clone())),
                Report::track(AnalyticsEvent::login(AuthProvider::Email.as_str())),
                Report::info(AUTH_CATEGORY, format!("User logged in: {}", user.name)),
            ];
            state.current_user = Some(user);
            reports(report)
        }

        AuthAction::LoginResponse(Err(e)) => {
            state.is_loading = false;
            let message = format!("Login failed: {e}");
            state.login_error = Some(e);
            reports(vec![
                Report::track(AnalyticsEvent::login("email_failed")),
                Report::warning(AUTH_CATEGORY, message),
            ])
        }

        AuthAction::SignUp(credentials, password) => {
            state.sign_up_error = None;
            match credentials.validate_sign_up(&password) {
                Ok(()) => {
                    state.is_loading = true;
                    UpdateResult::effect(AuthEffect::SignUp(credentials, password))
                }
                Err(e) => UpdateResult::message(AuthAction::SignUpResponse(Err(e))),
            }
        }

        AuthAction::SignUpResponse(Ok(user)) => {
            state.is_loading = false;
            state.sign_up_error = None;
            reports(vec![
                Report::track(AnalyticsEvent::new("sign_up_completed").with_param("method", "email")),
                Report::info(AUTH_CATEGORY, format!("User signed up: {}", user.name)),
            ])
        }

        AuthAction::SignUpResponse(Err(e)) => {
            state.is_loading = false;
            let report = vec![
                failure_event("sign_up_failed", &e),
                Report::warning(AUTH_CATEGORY, format!("Sign up failed: {e}")),
            ];
            state.sign_up_error = Some(e);
            reports(report)
        }

        // ─────────────────────────────────────────────────────────
        // Session
        // ─────────────────────────────────────────────────────────
        AuthAction::Logout => {
            state.is_loading = true;
            UpdateResult::effect(AuthEffect::Logout)
        }

        AuthAction::LogoutResponse => {
            state.is_loading = false;
            state.login_error = None;
            let previous = state.current_user.take().map(|u| u.name);
            state.sign_out();

            let mut report = vec![Report::track(AnalyticsEvent::logout()), Report::ResetAnalytics];
            if let Some(name) = previous {
                report.push(Report::info(AUTH_CATEGORY, format!("User logged out: {name}")));
            }
            reports(report)
        }

        AuthAction::RefreshToken => match state.refresh_token.clone() {
            Some(token) => UpdateResult::effect(AuthEffect::RefreshToken(token)),
            None => UpdateResult::message(AuthAction::RefreshTokenResponse(Err(
                AuthenticationError::TokenExpired,
            ))),
        },

        AuthAction::RefreshTokenResponse(Ok(token)) => {
            state.refresh_token = Some(token.refresh_token);
            let report = vec![Report::info(
                AUTH_CATEGORY,
                format!("Token refreshed for user: {}", token.user.name),
            )];
            state.current_user = Some(token.user);
            reports(report)
        }

        AuthAction::RefreshTokenResponse(Err(_)) => {
            state.sign_out();
            reports(vec![
                Report::track(AnalyticsEvent::logout()),
                Report::ResetAnalytics,
                Report::warning(AUTH_CATEGORY, "Token refresh failed, user logged out"),
            ])
        }

        AuthAction::LoadCurrentUser => UpdateResult::effect(AuthEffect::LoadCurrentUser),

        AuthAction::LoadCurrentUserResponse(user) => {
            let report = user
                .as_ref()
                .map(|u| Report::info(AUTH_CATEGORY, format!("Current user loaded: {}", u.name)));
            if user.is_none() {
                state.refresh_token = None;
            }
            state.current_user = user;
            match report {
                Some(report) => reports(vec![report]),
                None => UpdateResult::none(),
            }
        }

        // ─────────────────────────────────────────────────────────
        // Account
        // ─────────────────────────────────────────────────────────
        AuthAction::ResetPassword(email) => {
            state.is_loading = true;
            state.reset_password_error = None;
            UpdateResult::effect(AuthEffect::ResetPassword(email))
        }

        AuthAction::ResetPasswordResponse(Ok(())) => {
            state.is_loading = false;
            reports(vec![
                Report::track(AnalyticsEvent::new("password_reset_completed")),
                Report::info(AUTH_CATEGORY, "Password reset completed"),
            ])
        }

        AuthAction::ResetPasswordResponse(Err(e)) => {
            state.is_loading = false;
            let report = vec![
                failure_event("password_reset_failed", &e),
                Report::warning(AUTH_CATEGORY, format!("Password reset failed: {e}")),
            ];
            state.reset_password_error = Some(e);
            reports(report)
        }

        AuthAction::UpdateProfile(user) => {
            state.is_loading = true;
            state.update_profile_error = None;
            UpdateResult::effect(AuthEffect::UpdateProfile(user))
        }

        AuthAction::UpdateProfileResponse(Ok(user)) => {
            state.is_loading = false;
            state.update_profile_error = None;
            let report = vec![
                Report::track(AnalyticsEvent::new("profile_updated")),
                Report::info(AUTH_CATEGORY, format!("Profile updated for user: {}", user.name)),
            ];
            state.current_user = Some(user);
            reports(report)
        }

        AuthAction::UpdateProfileResponse(Err(e)) => {
            state.is_loading = false;
            let report = vec![
                failure_event("profile_update_failed", &e),
                Report::warning(AUTH_CATEGORY, format!("Profile update failed: {e}")),
            ];
            state.update_profile_error = Some(e);
            reports(report)
        }

        AuthAction::DeleteAccount(password) => {
            state.is_loading = true;
            UpdateResult::effect(AuthEffect::DeleteAccount(password))
        }

        AuthAction::DeleteAccountResponse(Ok(())) => {
            state.is_loading = false;
            state.sign_out();
            reports(vec![
                Report::track(AnalyticsEvent::new("account_deleted")),
                Report::ResetAnalytics,
                Report::info(AUTH_CATEGORY, "Account deleted"),
            ])
        }

        AuthAction::DeleteAccountResponse(Err(e)) => {
            state.is_loading = false;
            reports(vec![
                failure_event("account_deletion_failed", &e),
                Report::warning(AUTH_CATEGORY, format!("Account deletion failed: {e}")),
            ])
        }

        AuthAction::ClearErrors => {
            state.login_error = None;
            state.sign_up_error = None;
            state.reset_password_error = None;
            state.update_profile_error = None;
            UpdateResult::none()
        }
    }
}
