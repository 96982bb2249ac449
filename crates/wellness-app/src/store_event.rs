//! Events broadcast by the store for external consumers
//!
//! The headless runner subscribes via `Store::subscribe()` and turns these
//! into NDJSON lines.

/// Events emitted by a [`Store`](crate::Store) after each processing cycle
#[derive(Debug, Clone)]
pub enum StoreEvent<S> {
    /// Processing `action` (and its follow-ups) changed the state
    StateChanged { action: &'static str, state: S },

    /// An effect task panicked; the store keeps running
    EffectFailed { message: String },

    /// The store is shutting down
    Shutdown,
}

impl<S> StoreEvent<S> {
    /// Short label for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::EffectFailed { .. } => "effect_failed",
            Self::Shutdown => "shutdown",
        }
    }
}
