//! Binding of state, actions, update function and effect runner

use std::fmt;
use std::future::Future;

use wellness_clients::Dependencies;
use wellness_core::AuthenticationError;

use crate::actions::{run_app_effect, run_auth_effect, ActionSender};
use crate::handler::{self, AppEffect, AuthEffect, UpdateResult};
use crate::message::{AppAction, AppError, AuthAction};
use crate::state::{AuthState, DemoState};

/// A feature the [`Store`](crate::Store) can drive
pub trait Feature: 'static {
    type State: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    type Action: Clone + fmt::Debug + Send + 'static;
    type Effect: Clone + fmt::Debug + Send + 'static;

    /// Pure transition; must not perform I/O
    fn update(
        state: &mut Self::State,
        action: Self::Action,
    ) -> UpdateResult<Self::Action, Self::Effect>;

    /// Execute one effect, sending follow-up actions through `tx`
    fn run_effect(
        effect: Self::Effect,
        deps: Dependencies,
        tx: ActionSender<Self::Action>,
    ) -> impl Future<Output = ()> + Send + 'static;

    fn action_name(action: &Self::Action) -> &'static str;

    /// Failure response standing in for an effect whose task panicked
    fn effect_panicked(effect: &Self::Effect, message: String) -> Option<Self::Action> {
        let _ = (effect, message);
        None
    }
}

/// The demo application shell
#[derive(Debug, Clone, Copy, Default)]
pub struct AppFeature;

impl Feature for AppFeature {
    type State = DemoState;
    type Action = AppAction;
    type Effect = AppEffect;

    fn update(state: &mut DemoState, action: AppAction) -> UpdateResult<AppAction, AppEffect> {
        handler::update_app(state, action)
    }

    fn run_effect(
        effect: AppEffect,
        deps: Dependencies,
        tx: ActionSender<AppAction>,
    ) -> impl Future<Output = ()> + Send + 'static {
        run_app_effect(effect, deps, tx)
    }

    fn action_name(action: &AppAction) -> &'static str {
        action.name()
    }

    fn effect_panicked(effect: &AppEffect, message: String) -> Option<AppAction> {
        match effect {
            AppEffect::DemoLogin { .. } => {
                Some(AppAction::LoginResponse(Err(AppError::LoginFailed(message))))
            }
            AppEffect::Report(_) => None,
        }
    }
}

/// Sign-in, session and account management
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthFeature;

impl Feature for AuthFeature {
    type State = AuthState;
    type Action = AuthAction;
    type Effect = AuthEffect;

    fn update(state: &mut AuthState, action: AuthAction) -> UpdateResult<AuthAction, AuthEffect> {
        handler::update_auth(state, action)
    }

    fn run_effect(
        effect: AuthEffect,
        deps: Dependencies,
        tx: ActionSender<AuthAction>,
    ) -> impl Future<Output = ()> + Send + 'static {
        run_auth_effect(effect, deps, tx)
    }

    fn action_name(action: &AuthAction) -> &'static str {
        action.name()
    }

    fn effect_panicked(effect: &AuthEffect, message: String) -> Option<AuthAction> {
        let err = AuthenticationError::UnknownError(message);
        let action = match effect {
            AuthEffect::Login(_) | AuthEffect::LoginWithSocial(..) => {
                AuthAction::LoginResponse(Err(err))
            }
            AuthEffect::SignUp(..) => AuthAction::SignUpResponse(Err(err)),
            AuthEffect::Logout => AuthAction::LogoutResponse,
            AuthEffect::RefreshToken(_) => AuthAction::RefreshTokenResponse(Err(err)),
            AuthEffect::ResetPassword(_) => AuthAction::ResetPasswordResponse(Err(err)),
            AuthEffect::UpdateProfile(_) => AuthAction::UpdateProfileResponse(Err(err)),
            AuthEffect::DeleteAccount(_) => AuthAction::DeleteAccountResponse(Err(err)),
            AuthEffect::LoadCurrentUser => AuthAction::LoadCurrentUserResponse(None),
            AuthEffect::Report(_) => return None,
        };
        Some(action)
    }
}
