//! Tests for handler module

use std::time::Duration;

use chrono::{DateTime, Utc};
use wellness_core::{
    AnalyticsValue, AuthCredentials, AuthProvider, AuthToken, AuthenticationError, LogLevel, User,
    UserProperty,
};

use super::*;
use crate::message::{AppError, DemoUser};
use crate::state::{AuthState, DemoState};

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

fn test_user() -> User {
    User::new("12345", "test@example.com", "Test User", epoch())
}

fn test_token() -> AuthToken {
    AuthToken::issue("jwt", "refresh-1", epoch(), test_user())
}

fn credentials() -> AuthCredentials {
    AuthCredentials::new("test@example.com", "password")
}

/// Reports of an auth result, flattened
fn auth_reports(result: &AuthUpdate) -> Vec<Report> {
    result
        .effects
        .iter()
        .flat_map(|e| match e {
            AuthEffect::Report(reports) => reports.clone(),
            _ => Vec::new(),
        })
        .collect()
}

fn app_reports(result: &AppUpdate) -> Vec<Report> {
    result
        .effects
        .iter()
        .flat_map(|e| match e {
            AppEffect::Report(reports) => reports.clone(),
            _ => Vec::new(),
        })
        .collect()
}

fn tracked(reports: &[Report]) -> Vec<&str> {
    reports
        .iter()
        .filter_map(|r| match r {
            Report::Track { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

fn log_levels(reports: &[Report]) -> Vec<LogLevel> {
    reports
        .iter()
        .filter_map(|r| match r {
            Report::Log { level, .. } => Some(*level),
            _ => None,
        })
        .collect()
}

fn all_actions() -> Vec<AuthAction> {
    vec![
        AuthAction::Login(credentials()),
        AuthAction::LoginWithSocial(AuthProvider::Google, "g-token".into()),
        AuthAction::LoginResponse(Ok(test_token())),
        AuthAction::LoginResponse(Err(AuthenticationError::InvalidCredentials)),
        AuthAction::SignUp(credentials(), "password".into()),
        AuthAction::SignUpResponse(Ok(test_user())),
        AuthAction::SignUpResponse(Err(AuthenticationError::WeakPassword)),
        AuthAction::Logout,
        AuthAction::LogoutResponse,
        AuthAction::RefreshToken,
        AuthAction::RefreshTokenResponse(Ok(test_token())),
        AuthAction::RefreshTokenResponse(Err(AuthenticationError::TokenExpired)),
        AuthAction::ResetPassword("test@example.com".into()),
        AuthAction::ResetPasswordResponse(Ok(())),
        AuthAction::ResetPasswordResponse(Err(AuthenticationError::AccountNotFound)),
        AuthAction::UpdateProfile(test_user()),
        AuthAction::UpdateProfileResponse(Ok(test_user())),
        AuthAction::UpdateProfileResponse(Err(AuthenticationError::NetworkError("x".into()))),
        AuthAction::DeleteAccount("password".into()),
        AuthAction::DeleteAccountResponse(Ok(())),
        AuthAction::DeleteAccountResponse(Err(AuthenticationError::AccountLocked)),
        AuthAction::LoadCurrentUser,
        AuthAction::LoadCurrentUserResponse(Some(test_user())),
        AuthAction::ClearErrors,
    ]
}

// ─────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────

#[test]
fn test_update_is_deterministic() {
    let signed_in = AuthState::signed_in(test_user(), "refresh-1");

    for start in [AuthState::new(), signed_in] {
        for action in all_actions() {
            let mut a = start.clone();
            let mut b = start.clone();
            let ra = update_auth(&mut a, action.clone());
            let rb = update_auth(&mut b, action);
            assert_eq!(a, b);
            assert_eq!(ra, rb);
        }
    }
}

#[test]
fn test_login_starts_loading_and_requests_login() {
    let mut state = AuthState {
        login_error: Some(AuthenticationError::InvalidCredentials),
        ..AuthState::default()
    };

    let result = update_auth(&mut state, AuthAction::Login(credentials()));

    assert!(state.is_loading);
    assert_eq!(state.login_error, None);
    assert_eq!(result.effects, vec![AuthEffect::Login(credentials())]);
    assert_eq!(result.message, None);
}

#[test]
fn test_social_login_requests_provider_login() {
    let mut state = AuthState::new();
    let result = update_auth(
        &mut state,
        AuthAction::LoginWithSocial(AuthProvider::Apple, "apple-token".into()),
    );

    assert!(state.is_loading);
    assert_eq!(
        result.effects,
        vec![AuthEffect::LoginWithSocial(AuthProvider::Apple, "apple-token".into())]
    );
}

#[test]
fn test_login_success_sets_user_and_reports() {
    let mut state = AuthState {
        is_loading: true,
        ..AuthState::default()
    };

    let result = update_auth(&mut state, AuthAction::LoginResponse(Ok(test_token())));

    assert!(!state.is_loading);
    assert_eq!(state.current_user.as_ref().map(|u| u.name.as_str()), Some("Test User"));
    assert_eq!(state.refresh_token.as_deref(), Some("refresh-1"));

    let reports = auth_reports(&result);
    assert_eq!(reports[0], Report::SetUserId(Some("12345".into())));
    assert_eq!(
        reports[1],
        Report::Track {
            name: "login_completed".into(),
            parameters: [("method".to_string(), AnalyticsValue::from("email"))].into(),
        }
    );
    assert_eq!(log_levels(&reports), vec![LogLevel::Info]);
}

#[test]
fn test_login_failure_stores_error() {
    let mut state = AuthState {
        is_loading: true,
        ..AuthState::default()
    };
    let error = AuthenticationError::NetworkError("Invalid email or password".into());

    let result = update_auth(&mut state, AuthAction::LoginResponse(Err(error.clone())));

    assert!(!state.is_loading);
    assert_eq!(state.login_error, Some(error));
    assert!(!state.is_authenticated());

    let reports = auth_reports(&result);
    assert_eq!(tracked(&reports), vec!["login_completed"]);
    assert!(matches!(
        &reports[0],
        Report::Track { parameters, .. }
            if parameters.get("method") == Some(&AnalyticsValue::from("email_failed"))
    ));
    assert_eq!(log_levels(&reports), vec![LogLevel::Warning]);
}

#[test]
fn test_sign_up_weak_password_fails_before_any_effect() {
    let mut state = AuthState::new();
    let creds = AuthCredentials::new("new@example.com", "short77");

    let result = update_auth(&mut state, AuthAction::SignUp(creds, "short77".into()));

    assert!(result.effects.is_empty());
    assert_eq!(
        result.message,
        Some(AuthAction::SignUpResponse(Err(AuthenticationError::WeakPassword)))
    );
    assert!(!state.is_loading);
}

#[test]
fn test_sign_up_invalid_email_fails_before_any_effect() {
    let mut state = AuthState::new();
    let creds = AuthCredentials::new("not-an-email", "longenough");

    let result = update_auth(&mut state, AuthAction::SignUp(creds, "longenough".into()));

    assert!(result.effects.is_empty());
    assert_eq!(
        result.message,
        Some(AuthAction::SignUpResponse(Err(AuthenticationError::InvalidEmail)))
    );
}

#[test]
fn test_valid_sign_up_requests_sign_up() {
    let mut state = AuthState::new();
    let creds = AuthCredentials::new("new@example.com", "password1");

    let result = update_auth(&mut state, AuthAction::SignUp(creds.clone(), "password1".into()));

    assert!(state.is_loading);
    assert_eq!(result.effects, vec![AuthEffect::SignUp(creds, "password1".into())]);
}

#[test]
fn test_sign_up_failure_tracks_error_description() {
    let mut state = AuthState::new();
    let result = update_auth(
        &mut state,
        AuthAction::SignUpResponse(Err(AuthenticationError::WeakPassword)),
    );

    assert_eq!(state.sign_up_error, Some(AuthenticationError::WeakPassword));
    let reports = auth_reports(&result);
    assert_eq!(
        reports[0],
        Report::Track {
            name: "sign_up_failed".into(),
            parameters: [(
                "error".to_string(),
                AnalyticsValue::from("Password is too weak")
            )]
            .into(),
        }
    );
}

#[test]
fn test_logout_tracks_exactly_once() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");
    state.login_error = Some(AuthenticationError::InvalidCredentials);

    let first = update_auth(&mut state, AuthAction::Logout);
    assert!(state.is_loading);
    assert_eq!(first.effects, vec![AuthEffect::Logout]);

    let second = update_auth(&mut state, AuthAction::LogoutResponse);
    assert!(!state.is_loading);
    assert!(!state.is_authenticated());
    assert_eq!(state.login_error, None);
    assert_eq!(state.refresh_token, None);

    let mut reports = auth_reports(&first);
    reports.extend(auth_reports(&second));
    assert_eq!(tracked(&reports), vec!["logout_completed"]);
    assert!(reports.contains(&Report::ResetAnalytics));
    assert!(reports.contains(&Report::info(AUTH_CATEGORY, "User logged out: Test User")));
}

#[test]
fn test_logout_response_without_user_skips_name_log() {
    let mut state = AuthState::new();
    let result = update_auth(&mut state, AuthAction::LogoutResponse);
    assert!(log_levels(&auth_reports(&result)).is_empty());
}

#[test]
fn test_refresh_without_token_fails_immediately() {
    let mut state = AuthState::new();
    let result = update_auth(&mut state, AuthAction::RefreshToken);

    assert!(result.effects.is_empty());
    assert_eq!(
        result.message,
        Some(AuthAction::RefreshTokenResponse(Err(AuthenticationError::TokenExpired)))
    );
}

#[test]
fn test_refresh_uses_stored_token() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");
    let result = update_auth(&mut state, AuthAction::RefreshToken);
    assert_eq!(result.effects, vec![AuthEffect::RefreshToken("refresh-1".into())]);
}

#[test]
fn test_refresh_success_rotates_token() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");
    let token = AuthToken::issue("jwt-2", "refresh-2", epoch(), test_user().with_premium(true));

    update_auth(&mut state, AuthAction::RefreshTokenResponse(Ok(token)));

    assert_eq!(state.refresh_token.as_deref(), Some("refresh-2"));
    assert!(state.current_user.unwrap().is_premium);
}

#[test]
fn test_refresh_failure_signs_out_unconditionally() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");

    let result = update_auth(
        &mut state,
        AuthAction::RefreshTokenResponse(Err(AuthenticationError::NetworkError("down".into()))),
    );

    assert!(!state.is_authenticated());
    assert_eq!(state.refresh_token, None);
    let reports = auth_reports(&result);
    assert_eq!(tracked(&reports), vec!["logout_completed"]);
    assert_eq!(log_levels(&reports), vec![LogLevel::Warning]);
}

#[test]
fn test_reset_password_flow() {
    let mut state = AuthState::new();
    let start = update_auth(&mut state, AuthAction::ResetPassword("a@b.co".into()));
    assert!(state.is_loading);
    assert_eq!(start.effects, vec![AuthEffect::ResetPassword("a@b.co".into())]);

    let done = update_auth(&mut state, AuthAction::ResetPasswordResponse(Ok(())));
    assert!(!state.is_loading);
    assert_eq!(tracked(&auth_reports(&done)), vec!["password_reset_completed"]);

    update_auth(
        &mut state,
        AuthAction::ResetPasswordResponse(Err(AuthenticationError::AccountNotFound)),
    );
    assert_eq!(state.reset_password_error, Some(AuthenticationError::AccountNotFound));
}

#[test]
fn test_update_profile_replaces_user() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");
    let renamed = test_user().with_name("Renamed");

    update_auth(&mut state, AuthAction::UpdateProfile(renamed.clone()));
    assert!(state.is_loading);

    let result = update_auth(&mut state, AuthAction::UpdateProfileResponse(Ok(renamed.clone())));
    assert_eq!(state.current_user, Some(renamed));
    assert_eq!(tracked(&auth_reports(&result)), vec!["profile_updated"]);
}

#[test]
fn test_update_profile_failure_keeps_user() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");
    let error = AuthenticationError::NetworkError("timeout".into());

    update_auth(&mut state, AuthAction::UpdateProfileResponse(Err(error.clone())));

    assert_eq!(state.update_profile_error, Some(error));
    assert_eq!(state.current_user, Some(test_user()));
}

#[test]
fn test_delete_account_success_signs_out() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");
    let result = update_auth(&mut state, AuthAction::DeleteAccountResponse(Ok(())));

    assert!(!state.is_authenticated());
    let reports = auth_reports(&result);
    assert_eq!(tracked(&reports), vec!["account_deleted"]);
    assert!(reports.contains(&Report::ResetAnalytics));
}

#[test]
fn test_delete_account_failure_keeps_user() {
    let mut state = AuthState::signed_in(test_user(), "refresh-1");
    state.is_loading = true;

    let result = update_auth(
        &mut state,
        AuthAction::DeleteAccountResponse(Err(AuthenticationError::AccountLocked)),
    );

    assert!(!state.is_loading);
    assert!(state.is_authenticated());
    assert_eq!(tracked(&auth_reports(&result)), vec!["account_deletion_failed"]);
}

#[test]
fn test_load_current_user_response() {
    let mut state = AuthState::new();
    let loaded = update_auth(&mut state, AuthAction::LoadCurrentUserResponse(Some(test_user())));
    assert!(state.is_authenticated());
    assert_eq!(log_levels(&auth_reports(&loaded)), vec![LogLevel::Info]);

    let cleared = update_auth(&mut state, AuthAction::LoadCurrentUserResponse(None));
    assert!(!state.is_authenticated());
    assert_eq!(cleared, UpdateResult::none());
}

#[test]
fn test_clear_errors_is_idempotent() {
    let mut state = AuthState {
        login_error: Some(AuthenticationError::InvalidCredentials),
        sign_up_error: Some(AuthenticationError::WeakPassword),
        reset_password_error: Some(AuthenticationError::AccountNotFound),
        update_profile_error: Some(AuthenticationError::TokenExpired),
        ..AuthState::default()
    };

    let first = update_auth(&mut state, AuthAction::ClearErrors);
    let once = state.clone();
    let second = update_auth(&mut state, AuthAction::ClearErrors);

    assert!(!state.has_error());
    assert_eq!(state, once);
    assert_eq!(first, UpdateResult::none());
    assert_eq!(second, UpdateResult::none());
}

#[test]
fn test_every_failure_response_clears_loading_and_reports() {
    let failures = vec![
        AuthAction::LoginResponse(Err(AuthenticationError::InvalidCredentials)),
        AuthAction::SignUpResponse(Err(AuthenticationError::InvalidEmail)),
        AuthAction::ResetPasswordResponse(Err(AuthenticationError::AccountNotFound)),
        AuthAction::UpdateProfileResponse(Err(AuthenticationError::AccountLocked)),
        AuthAction::DeleteAccountResponse(Err(AuthenticationError::AccountLocked)),
    ];

    for action in failures {
        let mut state = AuthState {
            is_loading: true,
            ..AuthState::default()
        };
        let result = update_auth(&mut state, action);
        let reports = auth_reports(&result);

        assert!(!state.is_loading);
        assert_eq!(tracked(&reports).len(), 1);
        assert_eq!(log_levels(&reports), vec![LogLevel::Warning]);
    }
}

// ─────────────────────────────────────────────────────────
// Application shell
// ─────────────────────────────────────────────────────────

#[test]
fn test_app_launched_tracks_launch() {
    let mut state = DemoState::new();
    let result = update_app(&mut state, AppAction::AppLaunched);

    assert_eq!(state, DemoState::new());
    assert_eq!(tracked(&app_reports(&result)), vec!["app_launched"]);
}

#[test]
fn test_login_button_starts_demo_login() {
    let mut state = DemoState::new();
    let result = update_app(&mut state, AppAction::LoginButtonTapped);

    assert!(state.is_logging_in);
    assert!(result.effects.contains(&AppEffect::DemoLogin {
        delay: Duration::from_secs(2)
    }));

    let reports = app_reports(&result);
    assert_eq!(tracked(&reports), vec!["login_completed"]);
    assert!(reports.contains(&Report::info(APP_CATEGORY, "Demo login started")));
}

#[test]
fn test_demo_login_success() {
    let mut state = DemoState {
        is_logging_in: true,
        ..DemoState::default()
    };

    let result = update_app(&mut state, AppAction::LoginResponse(Ok(DemoUser::demo())));

    assert!(!state.is_logging_in);
    assert!(state.is_logged_in);
    assert_eq!(state.user_name.as_deref(), Some("Demo User"));

    let reports = app_reports(&result);
    assert_eq!(reports[0], Report::SetUserId(Some("123".into())));
    assert_eq!(
        reports[1],
        Report::SetUserProperty(UserProperty::has_completed_onboarding())
    );
}

#[test]
fn test_demo_login_failure_logs_error() {
    let mut state = DemoState {
        is_logging_in: true,
        ..DemoState::default()
    };

    let result = update_app(
        &mut state,
        AppAction::LoginResponse(Err(AppError::LoginFailed("offline".into()))),
    );

    assert!(!state.is_logging_in);
    assert!(!state.is_logged_in);
    assert_eq!(log_levels(&app_reports(&result)), vec![LogLevel::Error]);
}

#[test]
fn test_logout_button_resets_session() {
    let mut state = DemoState {
        is_logged_in: true,
        user_name: Some("Demo User".into()),
        ..DemoState::default()
    };

    let result = update_app(&mut state, AppAction::LogoutButtonTapped);

    assert_eq!(state, DemoState::new());
    let reports = app_reports(&result);
    assert_eq!(tracked(&reports), vec!["logout_completed"]);
    assert!(reports.contains(&Report::ResetAnalytics));
}
