//! Logger client: structured application logs with an inspectable history

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use wellness_core::log_entry::metadata;
use wellness_core::{LogEntry, LogLevel};

use crate::sync::Locked;

/// Default number of entries kept by [`LiveLoggerClient`]
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

pub type Metadata = BTreeMap<String, String>;

pub trait LoggerClient: Send + Sync {
    fn log(&self, level: LogLevel, category: &str, message: &str, metadata: Metadata);

    /// Recorded entries at or above `min_level` (all entries for `None`)
    fn logs(&self, min_level: Option<LogLevel>) -> Vec<LogEntry>;

    fn clear_logs(&self);

    // ── Level helpers ───────────────────────────────────────────────────────

    fn debug(&self, category: &str, message: &str, metadata: Metadata) {
        self.log(LogLevel::Debug, category, message, metadata);
    }

    fn info(&self, category: &str, message: &str, metadata: Metadata) {
        self.log(LogLevel::Info, category, message, metadata);
    }

    fn warning(&self, category: &str, message: &str, metadata: Metadata) {
        self.log(LogLevel::Warning, category, message, metadata);
    }

    fn error(&self, category: &str, message: &str, metadata: Metadata) {
        self.log(LogLevel::Error, category, message, metadata);
    }

    fn critical(&self, category: &str, message: &str, metadata: Metadata) {
        self.log(LogLevel::Critical, category, message, metadata);
    }

    // ── Convenience ─────────────────────────────────────────────────────────

    /// Info for 2xx responses, warning for anything else or a missing status
    fn log_network_request(&self, url: &str, method: &str, status: Option<u16>) {
        let mut meta = metadata([("url", url), ("method", method)]);
        if let Some(code) = status {
            meta.insert("status_code".into(), code.to_string());
        }
        match status {
            Some(code) if (200..300).contains(&code) => {
                self.info("Network", "Request completed", meta)
            }
            _ => self.warning("Network", "Request completed with non-2xx status", meta),
        }
    }

    fn log_error(&self, error: &dyn std::error::Error, category: &str) {
        let type_name = format!("{error:?}")
            .split(['(', ' ', '{'])
            .next()
            .unwrap_or_default()
            .to_string();
        self.error(
            category,
            &error.to_string(),
            metadata([("error_type", type_name)]),
        );
    }

    fn log_user_action(&self, action: &str, parameters: Metadata) {
        self.info("UserAction", action, parameters);
    }

    fn log_analytics_event(&self, event_name: &str, parameters: Metadata) {
        self.debug(
            "Analytics",
            &format!("Event tracked: {event_name}"),
            parameters,
        );
    }

    fn log_performance(&self, operation: &str, duration: Duration) {
        self.info(
            "Performance",
            "Operation completed",
            metadata([
                ("operation", operation.to_string()),
                ("duration_ms", duration.as_millis().to_string()),
            ]),
        );
    }
}

fn filter_entries<'a>(
    entries: impl Iterator<Item = &'a LogEntry>,
    min_level: Option<LogLevel>,
) -> Vec<LogEntry> {
    entries
        .filter(|e| min_level.map_or(true, |min| e.level >= min))
        .cloned()
        .collect()
}

// ── Live ────────────────────────────────────────────────────────────────────

/// Forwards every entry to `tracing` and keeps a bounded history
#[derive(Debug)]
pub struct LiveLoggerClient {
    history: Locked<VecDeque<LogEntry>>,
    limit: usize,
}

impl LiveLoggerClient {
    pub fn new(limit: usize) -> Self {
        Self {
            history: Locked::new(VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT))),
            limit,
        }
    }
}

impl Default for LiveLoggerClient {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl LoggerClient for LiveLoggerClient {
    fn log(&self, level: LogLevel, category: &str, message: &str, metadata: Metadata) {
        let entry = LogEntry::new(level, category, message, metadata);
        let line = entry.formatted_message();

        match level {
            LogLevel::Debug => tracing::debug!(category, "{line}"),
            LogLevel::Info => tracing::info!(category, "{line}"),
            LogLevel::Warning => tracing::warn!(category, "{line}"),
            LogLevel::Error => tracing::error!(category, "{line}"),
            LogLevel::Critical => tracing::error!(category, critical = true, "{line}"),
        }

        self.history.with(|history| {
            history.push_back(entry);
            while history.len() > self.limit {
                history.pop_front();
            }
        });
    }

    fn logs(&self, min_level: Option<LogLevel>) -> Vec<LogEntry> {
        self.history.with(|h| filter_entries(h.iter(), min_level))
    }

    fn clear_logs(&self) {
        self.history.with(VecDeque::clear);
    }
}

// ── Mock ────────────────────────────────────────────────────────────────────

/// Records every entry, unbounded
#[derive(Debug, Default)]
pub struct MockLoggerClient {
    entries: Locked<Vec<LogEntry>>,
}

impl MockLoggerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged so far, in order
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .with(|e| e.iter().map(|entry| entry.message.clone()).collect())
    }
}

impl LoggerClient for MockLoggerClient {
    fn log(&self, level: LogLevel, category: &str, message: &str, metadata: Metadata) {
        tracing::trace!(category, severity = level.name(), "{message}");
        self.entries
            .with(|e| e.push(LogEntry::new(level, category, message, metadata)));
    }

    fn logs(&self, min_level: Option<LogLevel>) -> Vec<LogEntry> {
        self.entries.with(|e| filter_entries(e.iter(), min_level))
    }

    fn clear_logs(&self) {
        self.entries.with(Vec::clear);
    }
}
