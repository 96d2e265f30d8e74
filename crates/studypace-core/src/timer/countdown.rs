//! Drift-resistant countdown.
//!
//! Remaining time is derived from a wall-clock anchor and a base duration,
//! never from counting ticks, so a suspended process or a missed tick does
//! not make the countdown run slow. The countdown has no thread of its own:
//! the caller invokes `tick()` periodically and gets `true` back exactly
//! once, when the countdown reaches zero.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!         Expired  (reset() returns to Idle)
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Expired,
}

pub struct Countdown {
    clock: SharedClock,
    state: CountdownState,
    /// Duration handed to the last `reset()`; denominator for progress.
    total_ms: u64,
    /// Remaining time at the moment of the last anchor.
    base_ms: u64,
    /// Wall-clock time (epoch ms) the current run was anchored at.
    anchor_ms: Option<u64>,
}

impl std::fmt::Debug for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Countdown")
            .field("state", &self.state)
            .field("total_ms", &self.total_ms)
            .field("base_ms", &self.base_ms)
            .field("anchor_ms", &self.anchor_ms)
            .finish()
    }
}

impl Countdown {
    /// Create an idle countdown for `duration`. Nothing runs until `start()`.
    pub fn new(clock: SharedClock, duration: Duration) -> Self {
        let ms = duration_ms(duration);
        Self {
            clock,
            state: CountdownState::Idle,
            total_ms: ms,
            base_ms: ms,
            anchor_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == CountdownState::Expired
    }

    pub fn remaining_ms(&self) -> u64 {
        match self.anchor_ms {
            Some(anchor) => {
                let elapsed = self.clock.now_ms().saturating_sub(anchor);
                self.base_ms.saturating_sub(elapsed)
            }
            None => self.base_ms,
        }
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms())
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }

    /// 0.0 .. 1.0 share of the current duration already used.
    pub fn progress_fraction(&self) -> f64 {
        if self.total_ms == 0 {
            return if self.is_expired() { 1.0 } else { 0.0 };
        }
        let used = 1.0 - self.remaining_ms() as f64 / self.total_ms as f64;
        used.clamp(0.0, 1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Anchor to the current time and run. Returns `false` (and changes
    /// nothing) when already running or expired.
    pub fn start(&mut self) -> bool {
        match self.state {
            CountdownState::Idle | CountdownState::Paused => {
                self.anchor_ms = Some(self.clock.now_ms());
                self.state = CountdownState::Running;
                true
            }
            CountdownState::Running | CountdownState::Expired => false,
        }
    }

    /// Freeze the remaining time. No-op unless running.
    pub fn pause(&mut self) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }
        self.base_ms = self.remaining_ms();
        self.anchor_ms = None;
        self.state = CountdownState::Paused;
        true
    }

    /// Stop and load a new duration. Never reports expiry and never starts.
    pub fn reset(&mut self, duration: Duration) {
        let ms = duration_ms(duration);
        self.state = CountdownState::Idle;
        self.total_ms = ms;
        self.base_ms = ms;
        self.anchor_ms = None;
    }

    /// Recompute against the clock. Returns `true` exactly once per run,
    /// on the tick that observes zero; the countdown is stopped afterwards.
    pub fn tick(&mut self) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }
        if self.remaining_ms() > 0 {
            return false;
        }
        self.base_ms = 0;
        self.anchor_ms = None;
        self.state = CountdownState::Expired;
        true
    }
}

/// `MM:SS`, rounding partial seconds up so a fresh 30s countdown reads 00:30.
pub fn format_mm_ss(remaining: Duration) -> String {
    let ms = remaining.as_millis() as u64;
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn countdown(secs: u64) -> (Arc<ManualClock>, Countdown) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let timer = Countdown::new(clock.clone(), Duration::from_secs(secs));
        (clock, timer)
    }

    #[test]
    fn remaining_tracks_wall_clock_not_ticks() {
        let (clock, mut timer) = countdown(60);
        timer.start();
        // No ticks at all for 30s, as if the process had been suspended.
        clock.advance_secs(30);
        timer.pause();
        assert_eq!(timer.remaining(), Duration::from_secs(30));
    }

    #[test]
    fn many_ticks_do_not_accumulate_drift() {
        let (clock, mut timer) = countdown(10);
        timer.start();
        for _ in 0..20 {
            clock.advance_ms(250);
            assert!(!timer.tick());
        }
        timer.pause();
        assert_eq!(timer.remaining_ms(), 5_000);
    }

    #[test]
    fn double_start_is_a_noop() {
        let (clock, mut timer) = countdown(20);
        assert!(timer.start());
        clock.advance_secs(5);
        assert!(!timer.start());
        assert_eq!(timer.remaining(), Duration::from_secs(15));
    }

    #[test]
    fn pause_while_idle_is_a_noop() {
        let (_clock, mut timer) = countdown(20);
        assert!(!timer.pause());
        assert_eq!(timer.state(), CountdownState::Idle);
        assert_eq!(timer.remaining(), Duration::from_secs(20));
    }

    #[test]
    fn resume_reanchors_on_frozen_remaining() {
        let (clock, mut timer) = countdown(60);
        timer.start();
        clock.advance_secs(10);
        timer.pause();
        // Time passing while paused is not counted.
        clock.advance_secs(100);
        assert_eq!(timer.remaining(), Duration::from_secs(50));
        timer.start();
        clock.advance_secs(20);
        assert_eq!(timer.remaining(), Duration::from_secs(30));
    }

    #[test]
    fn expiry_is_reported_exactly_once() {
        let (clock, mut timer) = countdown(3);
        timer.start();
        clock.advance_secs(2);
        assert!(!timer.tick());
        clock.advance_secs(5);
        assert!(timer.tick());
        assert!(!timer.tick());
        assert!(timer.is_expired());
        assert_eq!(timer.remaining_ms(), 0);
        // Starting an expired countdown needs a reset first.
        assert!(!timer.start());
        assert!(!timer.tick());
    }

    #[test]
    fn reset_cancels_pending_expiry() {
        let (clock, mut timer) = countdown(5);
        timer.start();
        clock.advance_secs(10);
        timer.reset(Duration::from_secs(30));
        assert!(!timer.tick());
        assert_eq!(timer.state(), CountdownState::Idle);
        assert_eq!(timer.remaining(), Duration::from_secs(30));
    }

    #[test]
    fn zero_duration_expires_on_first_tick_after_start() {
        let (_clock, mut timer) = countdown(30);
        timer.reset(Duration::ZERO);
        assert!(!timer.tick());
        timer.start();
        assert!(timer.tick());
        assert_eq!(timer.progress_fraction(), 1.0);
    }

    #[test]
    fn progress_fraction_moves_from_zero_to_one() {
        let (clock, mut timer) = countdown(40);
        assert_eq!(timer.progress_fraction(), 0.0);
        timer.start();
        clock.advance_secs(10);
        assert!((timer.progress_fraction() - 0.25).abs() < 1e-9);
        clock.advance_secs(100);
        assert_eq!(timer.progress_fraction(), 1.0);
    }

    #[test]
    fn format_rounds_partial_seconds_up() {
        assert_eq!(format_mm_ss(Duration::from_secs(90)), "01:30");
        assert_eq!(format_mm_ss(Duration::from_millis(29_200)), "00:30");
        assert_eq!(format_mm_ss(Duration::ZERO), "00:00");
    }
}
