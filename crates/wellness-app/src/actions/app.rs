//! Effects of the demo application shell

use wellness_clients::Dependencies;

use super::{run_reports, ActionSender};
use crate::handler::AppEffect;
use crate::message::{AppAction, DemoUser};

pub async fn run_app_effect(effect: AppEffect, deps: Dependencies, tx: ActionSender<AppAction>) {
    match effect {
        AppEffect::Report(reports) => run_reports(&deps, reports).await,

        AppEffect::DemoLogin { delay } => {
            deps.date.sleep(delay).await;
            tx.send(AppAction::LoginResponse(Ok(DemoUser::demo()))).await;
        }
    }
}
