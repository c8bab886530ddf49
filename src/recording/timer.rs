//! Elapsed-time tracking and the dashboard display tick.
//!
//! Elapsed time is the sum of completed recording segments plus the running
//! segment, so time spent paused never counts. The display tick is polled by
//! the screen loop rather than driven by a thread.

use std::time::{Duration, Instant};

/// Interval between display refreshes while recording.
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Source of monotonic time, swappable in tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Formats whole elapsed seconds as `MM:SS`. Minutes are not wrapped at 60.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Stopwatch that only advances while running.
#[derive(Debug, Default)]
pub struct ElapsedTimer {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl ElapsedTimer {
    /// Starts a fresh measurement at zero.
    pub fn start(&mut self, now: Instant) {
        self.accumulated = Duration::ZERO;
        self.running_since = Some(now);
    }

    /// Freezes the elapsed value.
    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    /// Continues from the frozen value.
    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }
}

/// Lazy, restartable periodic tick.
///
/// `arm` schedules the first tick immediately; `poll` fires at most once per
/// call and reschedules itself. `disarm` drops any pending tick, so nothing
/// scheduled in one session can fire in the next.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    /// Returns true when a tick is due, scheduling the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use super::Clock;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    /// Clock advanced by hand; clones share the same time.
    #[derive(Clone)]
    pub struct ManualClock {
        now: Rc<Cell<Instant>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Rc::new(Cell::new(Instant::now())),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.now.get()
        }
    }
}
