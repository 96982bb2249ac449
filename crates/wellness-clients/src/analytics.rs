//! Analytics client: event tracking and user identification

use async_trait::async_trait;
use wellness_core::{AnalyticsEvent, UserProperty};

use crate::sync::Locked;

#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn track(&self, event: AnalyticsEvent);

    async fn set_user_property(&self, property: UserProperty);

    /// Associate subsequent events with `user_id` (`None` clears it)
    async fn set_user_id(&self, user_id: Option<String>);

    /// Drop queued events, properties and the user id
    async fn reset(&self);

    /// Deliver queued events
    async fn flush(&self);
}

#[derive(Debug, Default)]
struct Session {
    queue: Vec<AnalyticsEvent>,
    properties: Vec<UserProperty>,
    user_id: Option<String>,
}

/// Queued events that trigger a flush from `track`
pub const FLUSH_THRESHOLD: usize = 100;

// ── Live ────────────────────────────────────────────────────────────────────

/// Queues events locally and reports them through `tracing`.
///
/// There is no remote sink; `flush` logs the batch size and drains the queue.
/// The queue flushes itself once it holds [`FLUSH_THRESHOLD`] events.
#[derive(Debug, Default)]
pub struct LiveAnalyticsClient {
    session: Locked<Session>,
}

impl LiveAnalyticsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events waiting for the next flush
    pub fn queued(&self) -> usize {
        self.session.with(|s| s.queue.len())
    }
}

#[async_trait]
impl AnalyticsClient for LiveAnalyticsClient {
    async fn track(&self, event: AnalyticsEvent) {
        let params = serde_json::to_string(&event.parameters).unwrap_or_default();
        tracing::info!(target: "welltech::analytics", event = %event.name, %params, "Analytics event");
        let full = self.session.with(|s| {
            s.queue.push(event);
            s.queue.len() >= FLUSH_THRESHOLD
        });
        if full {
            self.flush().await;
        }
    }

    async fn set_user_property(&self, property: UserProperty) {
        tracing::info!(
            target: "welltech::analytics",
            key = %property.key,
            value = ?property.value,
            "User property"
        );
        self.session.with(|s| s.properties.push(property));
    }

    async fn set_user_id(&self, user_id: Option<String>) {
        tracing::info!(target: "welltech::analytics", user_id = ?user_id, "User id");
        self.session.with(|s| s.user_id = user_id);
    }

    async fn reset(&self) {
        tracing::info!(target: "welltech::analytics", "Analytics reset");
        self.session.set(Session::default());
    }

    async fn flush(&self) {
        let drained = self.session.with(|s| std::mem::take(&mut s.queue));
        tracing::info!(target: "welltech::analytics", count = drained.len(), "Flushing events");
    }
}

// ── Mock ────────────────────────────────────────────────────────────────────

/// Records everything for inspection. `flush` clears recorded events.
#[derive(Debug, Default)]
pub struct MockAnalyticsClient {
    session: Locked<Session>,
}

impl MockAnalyticsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_events(&self) -> Vec<AnalyticsEvent> {
        self.session.with(|s| s.queue.clone())
    }

    /// Names of the tracked events, in order
    pub fn event_names(&self) -> Vec<String> {
        self.session
            .with(|s| s.queue.iter().map(|e| e.name.clone()).collect())
    }

    pub fn user_properties(&self) -> Vec<UserProperty> {
        self.session.with(|s| s.properties.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.session.with(|s| s.user_id.clone())
    }
}

#[async_trait]
impl AnalyticsClient for MockAnalyticsClient {
    async fn track(&self, event: AnalyticsEvent) {
        self.session.with(|s| s.queue.push(event));
    }

    async fn set_user_property(&self, property: UserProperty) {
        self.session.with(|s| s.properties.push(property));
    }

    async fn set_user_id(&self, user_id: Option<String>) {
        self.session.with(|s| s.user_id = user_id);
    }

    async fn reset(&self) {
        self.session.set(Session::default());
    }

    async fn flush(&self) {
        self.session.with(|s| s.queue.clear());
    }
}
