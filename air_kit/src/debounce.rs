//! Global trigger cooldown.
//!
//! A stick resting in a region stays "in contact" for many frames.  After any
//! instrument fires, the debouncer reports [`DebounceState::Cooling`] until
//! the cooldown has elapsed, and the frame loop skips evaluation for *every*
//! instrument meanwhile.  One contact therefore produces one sound.
//!
//! ```text
//!            record_fire(t)
//!   Armed ─────────────────────▶ Cooling { remaining }
//!     ▲                               │
//!     └──── now - t >= cooldown ──────┘
//! ```

use std::time::{Duration, Instant};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceState {
    /// Evaluation runs and new fires are accepted.
    Armed,
    /// Evaluation is suppressed for `remaining`.
    Cooling { remaining: Duration },
}

impl DebounceState {
    pub fn is_armed(&self) -> bool {
        matches!(self, DebounceState::Armed)
    }
}

#[derive(Clone, Debug)]
pub struct TriggerDebouncer {
    cooldown:  Duration,
    last_fire: Option<Instant>,
}

impl TriggerDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        TriggerDebouncer { cooldown, last_fire: None }
    }

    pub fn cooldown(&self)  -> Duration        { self.cooldown }
    pub fn last_fire(&self) -> Option<Instant> { self.last_fire }

    pub fn state(&self, now: Instant) -> DebounceState {
        match self.last_fire {
            None => DebounceState::Armed,
            Some(t) => {
                let elapsed = now.saturating_duration_since(t);
                if elapsed >= self.cooldown {
                    DebounceState::Armed
                } else {
                    DebounceState::Cooling { remaining: self.cooldown - elapsed }
                }
            }
        }
    }

    pub fn is_armed(&self, now: Instant) -> bool {
        self.state(now).is_armed()
    }

    /// Start a cooldown window at `now`.
    pub fn record_fire(&mut self, now: Instant) {
        self.last_fire = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

impl Default for TriggerDebouncer {
    fn default() -> Self {
        TriggerDebouncer::new(DEFAULT_COOLDOWN)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn starts_armed() {
        let d = TriggerDebouncer::default();
        assert_eq!(d.state(Instant::now()), DebounceState::Armed);
        assert!(d.last_fire().is_none());
    }

    #[test]
    fn cools_for_exactly_the_cooldown() {
        let t0 = Instant::now();
        let mut d = TriggerDebouncer::default();
        d.record_fire(t0);

        assert_eq!(d.state(t0), DebounceState::Cooling { remaining: ms(200) });
        assert_eq!(d.state(t0 + ms(150)), DebounceState::Cooling { remaining: ms(50) });
        assert!(!d.is_armed(t0 + ms(199)));
        assert!(d.is_armed(t0 + ms(200)));
        assert!(d.is_armed(t0 + ms(1_000)));
    }

    #[test]
    fn a_new_fire_restarts_the_window() {
        let t0 = Instant::now();
        let mut d = TriggerDebouncer::new(ms(100));
        d.record_fire(t0);
        assert!(d.is_armed(t0 + ms(100)));
        d.record_fire(t0 + ms(100));
        assert!(!d.is_armed(t0 + ms(150)));
        assert!(d.is_armed(t0 + ms(200)));
    }

    #[test]
    fn clock_before_fire_still_cooling() {
        let t0 = Instant::now() + ms(50);
        let mut d = TriggerDebouncer::default();
        d.record_fire(t0);
        assert_eq!(d.state(t0 - ms(10)), DebounceState::Cooling { remaining: ms(200) });
    }

    #[test]
    fn reset_rearms() {
        let t0 = Instant::now();
        let mut d = TriggerDebouncer::default();
        d.record_fire(t0);
        d.reset();
        assert!(d.is_armed(t0));
    }
}
