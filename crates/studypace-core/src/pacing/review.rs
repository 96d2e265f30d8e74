//! Review block: a timed, free-navigation revisit of recently completed
//! slides. The block only moves its own cursor; it never touches the
//! session's `current_index`.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::session::Slide;
use crate::timer::Countdown;

pub const DEFAULT_REVIEW_BLOCK: Duration = Duration::from_secs(300);
pub const DEFAULT_REVIEW_EVERY: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewEndReason {
    Finished,
    TimedOut,
}

#[derive(Debug)]
pub struct ReviewBlock {
    slides: Vec<Slide>,
    cursor: usize,
    visited: BTreeSet<usize>,
    timer: Countdown,
}

impl ReviewBlock {
    /// Starts the block's own countdown immediately.
    pub fn start(clock: SharedClock, slides: Vec<Slide>, duration: Duration) -> Self {
        let mut timer = Countdown::new(clock, duration);
        timer.start();
        let mut visited = BTreeSet::new();
        if !slides.is_empty() {
            visited.insert(0);
        }
        Self {
            slides,
            cursor: 0,
            visited,
            timer,
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// 0-based position of the cursor within the block.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Slide> {
        self.slides.get(self.cursor)
    }

    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.timer.progress_fraction()
    }

    pub fn next(&mut self) -> bool {
        self.jump(self.cursor + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.cursor.checked_sub(1) {
            Some(position) => self.jump(position),
            None => false,
        }
    }

    /// Move straight to `position`. Out-of-range positions are ignored.
    pub fn jump(&mut self, position: usize) -> bool {
        if position >= self.slides.len() || position == self.cursor {
            return false;
        }
        self.cursor = position;
        self.visited.insert(position);
        true
    }

    /// `true` once, when the block's time runs out.
    pub fn tick(&mut self) -> bool {
        self.timer.tick()
    }

    pub fn stop(&mut self) {
        self.timer.pause();
    }
}
