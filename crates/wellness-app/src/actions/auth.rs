//! Effects of the authentication feature
//!
//! Client failures are logged and wrapped before they reach the reducer:
//! social login failures become `SocialAuthError`, everything else
//! `NetworkError` carrying the client's description.

use wellness_clients::{Dependencies, Metadata};
use wellness_core::AuthenticationError;

use super::{run_reports, ActionSender};
use crate::handler::{AuthEffect, AUTH_CATEGORY};
use crate::message::AuthAction;

fn network_error(deps: &Dependencies, what: &str, err: AuthenticationError) -> AuthenticationError {
    deps.logger
        .error(AUTH_CATEGORY, &format!("{what} failed: {err}"), Metadata::new());
    AuthenticationError::NetworkError(err.to_string())
}

pub async fn run_auth_effect(effect: AuthEffect, deps: Dependencies, tx: ActionSender<AuthAction>) {
    let auth = deps.authentication.clone();

    match effect {
        AuthEffect::Login(credentials) => {
            let result = auth
                .login(credentials)
                .await
                .map_err(|e| network_error(&deps, "Login", e));
            tx.send(AuthAction::LoginResponse(result)).await;
        }

        AuthEffect::LoginWithSocial(provider, token) => {
            let result = auth.login_with_social(provider, token).await.map_err(|e| {
                deps.logger.error(
                    AUTH_CATEGORY,
                    &format!("Social login failed: {e}"),
                    Metadata::new(),
                );
                AuthenticationError::SocialAuthError(e.to_string())
            });
            tx.send(AuthAction::LoginResponse(result)).await;
        }

        AuthEffect::SignUp(credentials, password) => {
            let result = auth
                .sign_up(credentials, password)
                .await
                .map_err(|e| network_error(&deps, "Sign up", e));
            tx.send(AuthAction::SignUpResponse(result)).await;
        }

        AuthEffect::Logout => {
            if let Err(e) = auth.logout().await {
                deps.logger
                    .warning(AUTH_CATEGORY, &format!("Logout failed: {e}"), Metadata::new());
            }
            tx.send(AuthAction::LogoutResponse).await;
        }

        AuthEffect::RefreshToken(refresh_token) => {
            let result = auth
                .refresh_token(refresh_token)
                .await
                .map_err(|e| network_error(&deps, "Token refresh", e));
            tx.send(AuthAction::RefreshTokenResponse(result)).await;
        }

        AuthEffect::ResetPassword(email) => {
            let result = auth
                .reset_password(email)
                .await
                .map_err(|e| network_error(&deps, "Password reset", e));
            tx.send(AuthAction::ResetPasswordResponse(result)).await;
        }

        AuthEffect::UpdateProfile(user) => {
            let result = auth
                .update_profile(user)
                .await
                .map_err(|e| network_error(&deps, "Profile update", e));
            tx.send(AuthAction::UpdateProfileResponse(result)).await;
        }

        AuthEffect::DeleteAccount(password) => {
            let result = auth
                .delete_account(password)
                .await
                .map_err(|e| network_error(&deps, "Account deletion", e));
            tx.send(AuthAction::DeleteAccountResponse(result)).await;
        }

        AuthEffect::LoadCurrentUser => {
            let user = auth.current_user().await;
            tx.send(AuthAction::LoadCurrentUserResponse(user)).await;
        }

        AuthEffect::Report(reports) => run_reports(&deps, reports).await,
    }
}
