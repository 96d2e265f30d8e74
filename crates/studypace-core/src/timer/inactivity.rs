//! Inactivity ("boredom") detection.
//!
//! A polled signal source: `poll()` reports `true` when nothing was recorded
//! through `record_activity()` for longer than the timeout. It never touches
//! session state; the orchestrator decides what the signal means.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;

/// Input events that count as the user being present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerMove,
    Press,
    KeyPress,
    Scroll,
    Touch,
}

pub struct InactivityDetector {
    clock: SharedClock,
    timeout_ms: u64,
    poll_interval_ms: u64,
    last_activity_ms: u64,
    last_poll_ms: u64,
    active: bool,
}

impl InactivityDetector {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    pub fn new(clock: SharedClock, timeout: Duration, poll_interval: Duration) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            timeout_ms: timeout.as_millis() as u64,
            poll_interval_ms: poll_interval.as_millis() as u64,
            last_activity_ms: now,
            last_poll_ms: now,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn idle_for(&self) -> Duration {
        Duration::from_millis(self.clock.now_ms().saturating_sub(self.last_activity_ms))
    }

    /// Attach or detach. Attaching starts a fresh idle span.
    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            let now = self.clock.now_ms();
            self.last_activity_ms = now;
            self.last_poll_ms = now;
        }
        self.active = active;
    }

    /// Ignored while detached.
    pub fn record_activity(&mut self, kind: ActivityKind) {
        if !self.active {
            return;
        }
        tracing::trace!(?kind, "activity recorded");
        self.last_activity_ms = self.clock.now_ms();
    }

    /// Checks at most once per poll interval. On trigger the idle span
    /// restarts so the same quiet period is reported only once.
    pub fn poll(&mut self) -> bool {
        if !self.active {
            return false;
        }
        let now = self.clock.now_ms();
        if now.saturating_sub(self.last_poll_ms) < self.poll_interval_ms {
            return false;
        }
        self.last_poll_ms = now;
        if now.saturating_sub(self.last_activity_ms) > self.timeout_ms {
            self.last_activity_ms = now;
            return true;
        }
        false
    }
}
