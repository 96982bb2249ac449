//! Effect runner: interprets effect values against the injected clients
//!
//! Each effect runs on its own task. Follow-up actions go back to the store
//! through an [`ActionSender`] in the order the effect produces them.

use tokio::sync::mpsc;
use wellness_clients::{Dependencies, Metadata};
use wellness_core::AnalyticsEvent;

use crate::handler::Report;

pub mod app;
pub mod auth;

pub use app::run_app_effect;
pub use auth::run_auth_effect;

/// Sending half handed to running effects
#[derive(Debug)]
pub struct ActionSender<A> {
    tx: mpsc::Sender<A>,
}

impl<A> Clone for ActionSender<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A: Send + 'static> ActionSender<A> {
    pub fn new(tx: mpsc::Sender<A>) -> Self {
        Self { tx }
    }

    /// Deliver `action` to the store. Returns false once the store is gone;
    /// the action is dropped.
    pub async fn send(&self, action: A) -> bool {
        if self.tx.send(action).await.is_err() {
            tracing::debug!("Store closed, dropping action");
            return false;
        }
        true
    }
}

/// Run a batch of reports in order
pub async fn run_reports(deps: &Dependencies, reports: Vec<Report>) {
    for report in reports {
        match report {
            Report::Track { name, parameters } => {
                let event = AnalyticsEvent {
                    name,
                    parameters,
                    timestamp: deps.date.now(),
                };
                deps.analytics.track(event).await;
            }
            Report::SetUserId(user_id) => deps.analytics.set_user_id(user_id).await,
            Report::SetUserProperty(property) => deps.analytics.set_user_property(property).await,
            Report::ResetAnalytics => deps.analytics.reset().await,
            Report::Log {
                level,
                category,
                message,
            } => deps.logger.log(level, category, &message, Metadata::new()),
        }
    }
}
