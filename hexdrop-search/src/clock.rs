//! Time sources for the search budget

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Elapsed time since the search started
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// Wall clock
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Deterministic clock for tests: every reading advances it by `step`
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    step: Duration,
}

impl ManualClock {
    /// Frozen at `now`
    pub fn fixed(now: Duration) -> Self {
        Self {
            now: Cell::new(now),
            step: Duration::ZERO,
        }
    }

    /// Starts at zero and ticks `step` per reading
    pub fn stepping(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}
