//! Calendar and wall-clock source.
//!
//! Day keys are local calendar dates. Components ask a `Clock` instead of
//! reading system time so tests can pin "today".

use chrono::{Duration, Local, NaiveDate, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    /// Today's local calendar date
    fn today(&self) -> NaiveDate;

    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Real time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    state: Mutex<(NaiveDate, i64)>,
}

impl FixedClock {
    pub fn new(today: NaiveDate, now_millis: i64) -> Self {
        Self {
            state: Mutex::new((today, now_millis)),
        }
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0 = today;
    }

    pub fn advance_days(&self, days: i64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.0 = state.0 + Duration::days(days);
        state.1 += days * 86_400_000;
    }

    pub fn advance_millis(&self, ms: i64) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1 += ms;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn now_millis(&self) -> i64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

/// ISO `YYYY-MM-DD` key for a date
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a stored day key. Malformed keys yield `None`.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}
