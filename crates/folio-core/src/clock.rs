//! Time sources.
//!
//! Token expiry and record timestamps read the time through [`Clock`] so that
//! tests can pin or advance it.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to. Microsecond resolution.
#[derive(Debug)]
pub struct ManualClock {
  micros: AtomicI64,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { micros: AtomicI64::new(start.timestamp_micros()) }
  }

  pub fn set(&self, at: DateTime<Utc>) {
    self.micros.store(at.timestamp_micros(), Ordering::SeqCst);
  }

  pub fn advance(&self, by: Duration) {
    let step = by.num_microseconds().unwrap_or(i64::MAX);
    self.micros.fetch_add(step, Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst))
      .unwrap_or_default()
  }
}
