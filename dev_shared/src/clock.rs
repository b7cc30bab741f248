use std::collections::VecDeque;
use std::time::{Duration, Instant};

use bss::Clock;

/// [`Clock`] that makes the timed builds of a harness take predetermined durations.
#[derive(Clone, Debug)]
pub struct ScriptedClock {
  base: Instant,
  timestamps: VecDeque<Duration>,
}

impl ScriptedClock {
  /// Creates a clock where the `n`th timed build takes the `n`th of `durations`. Each build reads the clock twice.
  pub fn from_build_durations(durations: impl IntoIterator<Item=Duration>) -> Self {
    let mut timestamps = VecDeque::new();
    let mut elapsed = Duration::ZERO;
    for duration in durations {
      timestamps.push_back(elapsed);
      elapsed += duration;
      timestamps.push_back(elapsed);
      elapsed += Duration::from_secs(1);
    }
    Self { base: Instant::now(), timestamps }
  }

  /// Returns whether every scripted timestamp was read.
  #[inline]
  pub fn is_exhausted(&self) -> bool { self.timestamps.is_empty() }
}

impl Clock for ScriptedClock {
  fn now(&mut self) -> Instant {
    let offset = self.timestamps.pop_front().expect("scripted clock ran out of timestamps");
    self.base + offset
  }
}
