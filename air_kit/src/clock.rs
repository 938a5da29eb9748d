//! Time sources for the frame loop.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

/// Hand-driven clock for simulations and tests.
///
/// Clones share the same time, so a scripted frame source can advance the
/// clock the loop reads from.
#[derive(Clone, Debug)]
pub struct ManualClock {
    start: Instant,
    now:   Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Instant::now();
        ManualClock { start, now: Rc::new(Cell::new(start)) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump to `offset` after creation.  Never moves backwards.
    pub fn set_elapsed(&self, offset: Duration) {
        let target = self.start + offset;
        if target > self.now.get() {
            self.now.set(target);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.now.get() - self.start
    }
}

impl Default for ManualClock {
    fn default() -> Self { Self::new() }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant { self.now.get() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(Duration::from_millis(150));
        assert_eq!(b.elapsed(), Duration::from_millis(150));
        assert_eq!(a.now(), b.now());
    }

    #[test]
    fn set_elapsed_is_monotonic() {
        let c = ManualClock::new();
        c.set_elapsed(Duration::from_millis(300));
        c.set_elapsed(Duration::from_millis(100));
        assert_eq!(c.elapsed(), Duration::from_millis(300));
    }
}
