//! Date client: the clock and calendar helpers
//!
//! All calendar arithmetic is done in UTC. Weeks start on Sunday.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::sync::Locked;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Source of the current time and of timed suspension
#[async_trait]
pub trait DateClient: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the calling task for `duration`
    async fn sleep(&self, duration: Duration);

    // ── Helpers ─────────────────────────────────────────────────────────────

    /// Instant `secs` seconds after the Unix epoch
    fn date(&self, secs: f64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((secs * 1000.0) as i64)
    }

    /// Seconds elapsed from `date` until now (negative for future dates)
    fn time_interval_since(&self, date: DateTime<Utc>) -> f64 {
        seconds_between(date, self.now())
    }

    fn adding_time_interval(&self, secs: f64) -> DateTime<Utc> {
        self.now() + TimeDelta::milliseconds((secs * 1000.0) as i64)
    }

    fn tomorrow(&self) -> DateTime<Utc> {
        self.now() + TimeDelta::seconds(SECONDS_PER_DAY)
    }

    fn yesterday(&self) -> DateTime<Utc> {
        self.now() - TimeDelta::seconds(SECONDS_PER_DAY)
    }

    fn start_of_day(&self) -> DateTime<Utc> {
        start_of_day(self.now())
    }

    /// Last second of the current day (23:59:59)
    fn end_of_day(&self) -> DateTime<Utc> {
        self.start_of_day() + TimeDelta::seconds(SECONDS_PER_DAY - 1)
    }

    fn start_of_week(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        let back = date.weekday().num_days_from_sunday() as i64;
        start_of_day(date) - TimeDelta::days(back)
    }

    fn start_of_month(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        let day = date.date_naive();
        midnight(day - TimeDelta::days(day.day0() as i64))
    }

    fn start_of_year(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        let day = date.date_naive();
        midnight(day - TimeDelta::days(day.ordinal0() as i64))
    }

    /// Whole days from `start` to `end`, truncated toward zero
    fn days_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        (end - start).num_days()
    }

    fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        a.date_naive() == b.date_naive()
    }

    fn is_today(&self, date: DateTime<Utc>) -> bool {
        self.is_same_day(date, self.now())
    }

    fn is_yesterday(&self, date: DateTime<Utc>) -> bool {
        self.is_same_day(date, self.yesterday())
    }

    fn is_tomorrow(&self, date: DateTime<Utc>) -> bool {
        self.is_same_day(date, self.tomorrow())
    }
}

fn start_of_day(date: DateTime<Utc>) -> DateTime<Utc> {
    midnight(date.date_naive())
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

// ── Live ────────────────────────────────────────────────────────────────────

/// Wall clock and tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveDateClient;

#[async_trait]
impl DateClient for LiveDateClient {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ── Mock ────────────────────────────────────────────────────────────────────

/// Deterministic clock.
///
/// A fixed clock always reports the same instant. An advancing clock moves
/// forward by `step` on every [`DateClient::now`] call. `sleep` returns
/// immediately and records the requested duration.
#[derive(Debug)]
pub struct MockDateClient {
    current: Locked<DateTime<Utc>>,
    step: TimeDelta,
    sleeps: Locked<Vec<Duration>>,
}

impl MockDateClient {
    pub fn fixed(instant: DateTime<Utc>) -> Self {
        Self {
            current: Locked::new(instant),
            step: TimeDelta::zero(),
            sleeps: Locked::default(),
        }
    }

    /// Clock starting at `start`; each `now()` first advances by `step`
    pub fn advancing(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            step,
            ..Self::fixed(start)
        }
    }

    /// Durations passed to `sleep`, in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.get()
    }
}

impl Default for MockDateClient {
    fn default() -> Self {
        Self::fixed(Utc::now())
    }
}

#[async_trait]
impl DateClient for MockDateClient {
    fn now(&self) -> DateTime<Utc> {
        self.current.with(|current| {
            *current += self.step;
            *current
        })
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.with(|s| s.push(duration));
    }
}
