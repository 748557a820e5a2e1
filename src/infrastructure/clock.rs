use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

use crate::domain::auth::ports::Clock;

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Manually driven clock for tests and tooling
#[derive(Debug)]
pub struct ManualClock {
  now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      now: RwLock::new(now),
    }
  }

  /// Moves the clock forward (or backward for a negative duration)
  pub fn advance(&self, by: Duration) {
    let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *now += by;
  }

  pub fn set(&self, to: DateTime<Utc>) {
    let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *now = to;
  }
}

impl Default for ManualClock {
  fn default() -> Self {
    Self::new(Utc::now())
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_manual_clock_advance() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = ManualClock::new(start);

    clock.advance(Duration::hours(5));
    assert_eq!(clock.now(), start + Duration::hours(5));

    clock.set(start);
    assert_eq!(clock.now(), start);
  }

  #[test]
  fn test_system_clock_moves() {
    let before = Utc::now();
    assert!(SystemClock.now() >= before);
  }
}
