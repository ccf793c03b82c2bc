//! Time source abstraction.
//!
//! Everything that compares against hold expiry reads time through a
//! [`Clock`], so tests can move time forward without sleeping.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
  now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { now: Arc::new(Mutex::new(start)) }
  }

  pub fn advance(&self, by: Duration) { *self.now.lock() += by; }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> { *self.now.lock() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn manual_clock_shares_time_between_clones() {
    let start = Utc::now();
    let clock = ManualClock::new(start);
    let other = clock.clone();
    clock.advance(Duration::seconds(30));
    assert_eq!(other.now(), start + Duration::seconds(30));
  }
}
