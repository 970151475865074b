//! Wall-time source, injected everywhere a pure function would otherwise
//! have to read the clock itself. Nothing under `phase`, `planner`,
//! `strategy` or `pagination` calls `Utc::now()` directly — `now` always
//! arrives as a parameter, so those modules stay deterministic under test.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// A source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the actual system clock. Used everywhere outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that returns a fixed, settable instant. Used by tests that need
/// deterministic behaviour out of the phase classifier, state machine,
/// planner and pagination controller.
#[derive(Debug)]
pub struct MockClock {
    epoch_seconds: AtomicI64,
}

impl MockClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            epoch_seconds: AtomicI64::new(now.timestamp()),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.epoch_seconds.store(now.timestamp(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.epoch_seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.epoch_seconds.load(Ordering::SeqCst), 0)
            .expect("stored epoch seconds always construct a valid DateTime")
    }
}
