//! Pacing orchestrator.
//!
//! Wires the slide countdown, the inactivity detector, the session store and
//! the review block together. Like the timers it has no thread of its own:
//! front ends forward user commands and call `tick()` periodically, and every
//! call returns the [`Event`]s it produced.
//!
//! ## Slide Phases
//!
//! ```text
//! AwaitingDifficulty -> Timing -> Expired -> (advance | mark & advance) -> AwaitingDifficulty
//!                         ^          |
//!                         +- extend -+
//!
//! every `review_every` advances:  ... -> Reviewing -> AwaitingDifficulty
//! after the last slide:           ... -> Finished
//! ```
//!
//! Commands that make no sense in the current phase are ignored and return
//! no events; the orchestrator never fails.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::events::Event;
use crate::session::{
    Session, SessionStore, Slide, TimeAllocation, Transition, EXTENSION_LIMIT, EXTENSION_SECS,
};
use crate::summary::SessionSummary;
use crate::timer::{ActivityKind, Countdown, InactivityDetector};

use super::decision::{Decision, DecisionPrompt};
use super::review::{ReviewBlock, ReviewEndReason};
use super::settings::PacingSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlidePhase {
    /// Slide on screen, no time picked yet.
    AwaitingDifficulty,
    Timing,
    /// Time is up; the decision prompt is blocking.
    Expired,
    Reviewing,
    Finished,
}

/// Which screen the front end should be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Setup,
    Session,
    Summary,
}

pub struct PacingOrchestrator {
    clock: SharedClock,
    settings: PacingSettings,
    store: SessionStore,
    timer: Countdown,
    detector: InactivityDetector,
    phase: SlidePhase,
    selection: Option<TimeAllocation>,
    boredom_alert: bool,
    /// Advances since the last review block.
    block_advances: u32,
    review: Option<ReviewBlock>,
    slide_shown_ms: u64,
    entered: bool,
}

impl PacingOrchestrator {
    pub fn new(store: SessionStore, clock: SharedClock, settings: PacingSettings) -> Self {
        let timer = Countdown::new(clock.clone(), Duration::ZERO);
        let detector = InactivityDetector::new(
            clock.clone(),
            settings.boredom_timeout,
            settings.boredom_poll,
        );
        let slide_shown_ms = clock.now_ms();
        Self {
            clock,
            settings,
            store,
            timer,
            detector,
            phase: SlidePhase::AwaitingDifficulty,
            selection: None,
            boredom_alert: false,
            block_advances: 0,
            review: None,
            slide_shown_ms,
            entered: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SlidePhase {
        self.phase
    }

    pub fn route(&self) -> Route {
        if self.store.session().slides.is_empty() {
            Route::Setup
        } else if self.phase == SlidePhase::Finished {
            Route::Summary
        } else {
            Route::Session
        }
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    pub fn settings(&self) -> &PacingSettings {
        &self.settings
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.store.session().current_slide()
    }

    pub fn time_menu(&self) -> &[u64] {
        &self.settings.time_menu_secs
    }

    pub fn selection(&self) -> Option<TimeAllocation> {
        self.selection
    }

    /// Time left on the slide countdown.
    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.timer.progress_fraction()
    }

    pub fn boredom_alert(&self) -> bool {
        self.boredom_alert
    }

    pub fn block_advances(&self) -> u32 {
        self.block_advances
    }

    pub fn review(&self) -> Option<&ReviewBlock> {
        self.review.as_ref()
    }

    /// Only while the decision overlay is up.
    pub fn decision_prompt(&self) -> Option<DecisionPrompt> {
        (self.phase == SlidePhase::Expired)
            .then(|| DecisionPrompt::for_session(self.store.session()))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_session(self.store.session(), self.clock.now_utc())
    }

    pub fn snapshot(&self) -> Event {
        let (remaining_ms, total_ms, progress) = match &self.review {
            Some(review) => (
                review.remaining().as_millis() as u64,
                self.settings.review_block.as_millis() as u64,
                review.progress_fraction(),
            ),
            None => (
                self.timer.remaining_ms(),
                self.timer.total().as_millis() as u64,
                self.timer.progress_fraction(),
            ),
        };
        let session = self.store.session();
        Event::StateSnapshot {
            phase: self.phase,
            slide_index: session.current_index,
            slides_total: session.slides.len(),
            remaining_ms,
            total_ms,
            progress,
            extensions_used: session.extensions_used,
            panic_mode: session.panic_mode,
            boredom_alert: self.boredom_alert,
            block_advances: self.block_advances,
            at: self.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Enter the session screen. With no slides loaded nothing happens and
    /// `route()` keeps pointing at setup.
    pub fn enter(&mut self) -> Vec<Event> {
        if self.store.session().slides.is_empty() {
            tracing::warn!("no slides loaded, staying on setup");
            return Vec::new();
        }
        if self.entered {
            return Vec::new();
        }
        self.entered = true;
        if !self.store.session().active {
            self.store.start(None, None);
        }
        let session = self.store.session();
        tracing::info!(
            session_id = %session.id,
            slides = session.slides.len(),
            goal = %session.goal,
            "study session started"
        );
        let started = Event::SessionStarted {
            session_id: session.id.to_string(),
            slides_total: session.slides.len(),
            goal: session.goal.clone(),
            at: self.now(),
        };
        vec![started, self.show_slide()]
    }

    /// Allocate time to the current slide and (re)start its countdown.
    /// Picking again while timing replaces the running countdown.
    pub fn select_time(&mut self, allocation: TimeAllocation) -> Vec<Event> {
        if !self.entered
            || !matches!(
                self.phase,
                SlidePhase::AwaitingDifficulty | SlidePhase::Timing
            )
        {
            return Vec::new();
        }
        let Some(slide_id) = self.current_slide().map(|s| s.id) else {
            return Vec::new();
        };
        self.store.dispatch(Transition::SetSlideTime {
            slide_id,
            allocation,
        });
        let session = self.store.session();
        let secs = session
            .slide(slide_id)
            .and_then(|s| s.allocated_secs)
            .unwrap_or_else(|| allocation.resolve_secs(session.panic_mode));
        let panic_mode = session.panic_mode;

        self.timer.reset(Duration::from_secs(secs));
        self.timer.start();
        self.detector.set_active(self.settings.boredom_enabled);
        self.selection = Some(allocation);
        self.phase = SlidePhase::Timing;
        tracing::debug!(slide_id, secs, %allocation, "slide countdown started");

        let at = self.now();
        vec![
            Event::SlideTimeAllocated {
                slide_index: slide_id,
                allocated_secs: secs,
                panic_mode,
                at,
            },
            Event::TimerStarted {
                slide_index: slide_id,
                duration_secs: secs,
                at,
            },
        ]
    }

    /// Select by position in the time menu.
    pub fn select_menu_option(&mut self, position: usize) -> Vec<Event> {
        match self.settings.time_menu_secs.get(position).copied() {
            Some(secs) => self.select_time(TimeAllocation::ExplicitSeconds(secs)),
            None => Vec::new(),
        }
    }

    /// Drive the timers. Call at least every 500ms.
    pub fn tick(&mut self) -> Vec<Event> {
        match self.phase {
            SlidePhase::Reviewing => {
                let timed_out = self.review.as_mut().is_some_and(|r| r.tick());
                if timed_out {
                    self.end_review(ReviewEndReason::TimedOut)
                } else {
                    Vec::new()
                }
            }
            SlidePhase::Timing => {
                if self.timer.tick() {
                    return self.expire();
                }
                let idle_secs = self.detector.idle_for().as_secs();
                if self.detector.poll() && !self.boredom_alert {
                    self.boredom_alert = true;
                    let slide_index = self.store.session().current_index;
                    tracing::debug!(slide_index, idle_secs, "inactivity detected");
                    return vec![Event::BoredomDetected {
                        slide_index,
                        idle_secs,
                        at: self.now(),
                    }];
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn record_activity(&mut self, kind: ActivityKind) {
        self.detector.record_activity(kind);
    }

    pub fn dismiss_boredom(&mut self) {
        self.boredom_alert = false;
    }

    /// Resolve the decision prompt. Ignored unless the prompt is up and
    /// offers `decision`.
    pub fn decide(&mut self, decision: Decision) -> Vec<Event> {
        if self.phase != SlidePhase::Expired {
            return Vec::new();
        }
        match decision {
            Decision::Advance => self.advance(),
            Decision::MarkForReviewAndAdvance => {
                let mut events = self.mark_for_review();
                events.extend(self.advance());
                events
            }
            Decision::Extend => self.extend(),
        }
    }

    /// Flag the current slide. Allowed any time before moving past it.
    pub fn mark_for_review(&mut self) -> Vec<Event> {
        if !self.entered
            || !matches!(
                self.phase,
                SlidePhase::AwaitingDifficulty | SlidePhase::Timing | SlidePhase::Expired
            )
        {
            return Vec::new();
        }
        let Some(slide_id) = self.current_slide().map(|s| s.id) else {
            return Vec::new();
        };
        self.store.dispatch(Transition::MarkForReview { slide_id });
        vec![Event::SlideMarkedForReview {
            slide_index: slide_id,
            at: self.now(),
        }]
    }

    /// Manual "next slide"; needs a time to have been picked.
    pub fn next_slide(&mut self) -> Vec<Event> {
        if self.selection.is_none()
            || !matches!(self.phase, SlidePhase::Timing | SlidePhase::Expired)
        {
            return Vec::new();
        }
        self.advance()
    }

    pub fn review_next(&mut self) -> Vec<Event> {
        self.navigate_review(|review| review.next())
    }

    pub fn review_prev(&mut self) -> Vec<Event> {
        self.navigate_review(|review| review.prev())
    }

    /// Jump to a 0-based position inside the review block.
    pub fn review_jump(&mut self, position: usize) -> Vec<Event> {
        self.navigate_review(|review| review.jump(position))
    }

    pub fn finish_review(&mut self) -> Vec<Event> {
        if self.phase != SlidePhase::Reviewing {
            return Vec::new();
        }
        self.end_review(ReviewEndReason::Finished)
    }

    /// Throw the current run away and start over with an empty session.
    pub fn new_session(&mut self) {
        self.stop_all();
        self.store.reset();
        self.phase = SlidePhase::AwaitingDifficulty;
        self.selection = None;
        self.boredom_alert = false;
        self.block_advances = 0;
        self.entered = false;
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// Leave the session: stops every timer, detaches the detector and drops
    /// the in-memory state.
    pub fn exit(mut self) -> Event {
        self.stop_all();
        let slides_completed = self.store.session().slides_completed();
        tracing::info!(
            session_id = %self.store.session().id,
            slides_completed,
            "study session exited"
        );
        Event::SessionExited {
            slides_completed,
            at: self.now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now(&self) -> DateTime<Utc> {
        self.clock.now_utc()
    }

    fn stop_all(&mut self) {
        self.timer.pause();
        self.detector.set_active(false);
        if let Some(review) = self.review.as_mut() {
            review.stop();
        }
        self.review = None;
    }

    fn show_slide(&mut self) -> Event {
        self.phase = SlidePhase::AwaitingDifficulty;
        self.selection = None;
        self.boredom_alert = false;
        self.timer.reset(Duration::ZERO);
        self.detector.set_active(false);
        self.slide_shown_ms = self.clock.now_ms();
        let session = self.store.session();
        Event::SlideShown {
            slide_index: session.current_index,
            page_number: session.current_slide().map(|s| s.page_number).unwrap_or(0),
            at: self.now(),
        }
    }

    fn expire(&mut self) -> Vec<Event> {
        self.phase = SlidePhase::Expired;
        self.detector.set_active(false);
        let prompt = DecisionPrompt::for_session(self.store.session());
        tracing::debug!(slide_index = prompt.slide_index, "slide time expired");
        let at = self.now();
        vec![
            Event::TimerExpired {
                slide_index: prompt.slide_index,
                at,
            },
            Event::DecisionRequired { prompt, at },
        ]
    }

    fn extend(&mut self) -> Vec<Event> {
        let session = self.store.session();
        if session.extensions_used >= EXTENSION_LIMIT {
            tracing::debug!("extension refused, none left");
            return Vec::new();
        }
        let was_panic = session.panic_mode;
        let slide_index = session.current_index;

        let session = self.store.dispatch(Transition::UseExtension);
        let extensions_used = session.extensions_used;
        let extensions_remaining = session.extensions_remaining();
        let entered_panic = session.panic_mode && !was_panic;

        let remaining = self.timer.remaining() + Duration::from_secs(EXTENSION_SECS);
        self.timer.reset(remaining);
        self.timer.start();
        self.detector.set_active(self.settings.boredom_enabled);
        self.phase = SlidePhase::Timing;

        let at = self.now();
        let mut events = vec![Event::ExtensionUsed {
            slide_index,
            extensions_used,
            extensions_remaining,
            remaining_secs: remaining.as_secs(),
            at,
        }];
        if entered_panic {
            tracing::info!(extensions_used, "panic mode entered");
            events.push(Event::PanicModeEntered {
                extensions_used,
                at,
            });
        }
        events.push(Event::TimerStarted {
            slide_index,
            duration_secs: remaining.as_secs(),
            at,
        });
        events
    }

    fn advance(&mut self) -> Vec<Event> {
        self.timer.pause();
        self.detector.set_active(false);
        self.selection = None;
        self.boredom_alert = false;

        let time_spent_secs = self.clock.now_ms().saturating_sub(self.slide_shown_ms) / 1000;
        let session = self.store.session();
        let from_index = session.current_index;
        let was_last = session.is_last_slide();
        let current_id = session.current_slide().map(|s| s.id);
        if let Some(slide_id) = current_id {
            self.store.dispatch(Transition::RecordTimeSpent {
                slide_id,
                secs: time_spent_secs,
            });
        }
        self.store.dispatch(Transition::Advance);

        let mut events = vec![Event::SlideAdvanced {
            from_index,
            to_index: self.store.session().current_index,
            time_spent_secs,
            at: self.now(),
        }];
        if was_last {
            events.push(self.finish());
            return events;
        }
        self.block_advances += 1;
        if self.block_advances >= self.settings.review_every {
            events.extend(self.start_review());
        } else {
            events.push(self.show_slide());
        }
        events
    }

    fn finish(&mut self) -> Event {
        self.phase = SlidePhase::Finished;
        self.timer.reset(Duration::ZERO);
        self.detector.set_active(false);
        let summary = self.summary();
        tracing::info!(
            session_id = %summary.session_id,
            slides_completed = summary.slides_completed,
            slides_total = summary.slides_total,
            extensions_used = summary.extensions_used,
            "study session finished"
        );
        Event::SessionFinished {
            summary,
            at: self.now(),
        }
    }

    /// Hand timing to a review block over the slides completed since the
    /// last one. `current_index` already points at the next unseen slide.
    fn start_review(&mut self) -> Vec<Event> {
        let session = self.store.session();
        let end = session.current_index.min(session.slides.len());
        let count = (self.settings.review_every as usize).min(end);
        let slides = session.slides[end - count..end].to_vec();
        let slide_indices: Vec<usize> = slides.iter().map(|s| s.id).collect();

        self.timer.reset(Duration::ZERO);
        self.phase = SlidePhase::Reviewing;
        let block = ReviewBlock::start(self.clock.clone(), slides, self.settings.review_block);
        let is_empty = block.is_empty();
        self.review = Some(block);
        tracing::info!(?slide_indices, "review block started");

        let mut events = vec![Event::ReviewStarted {
            slide_indices,
            duration_secs: self.settings.review_block.as_secs(),
            at: self.now(),
        }];
        if is_empty {
            events.extend(self.end_review(ReviewEndReason::Finished));
        }
        events
    }

    /// Give control back; the next unseen slide waits for a time selection.
    fn end_review(&mut self, reason: ReviewEndReason) -> Vec<Event> {
        let Some(mut review) = self.review.take() else {
            return Vec::new();
        };
        review.stop();
        self.block_advances = 0;
        tracing::info!(?reason, visited = review.visited(), "review block finished");
        let finished = Event::ReviewFinished {
            reason,
            visited: review.visited(),
            total: review.len(),
            at: self.now(),
        };
        vec![finished, self.show_slide()]
    }

    fn navigate_review(&mut self, step: impl FnOnce(&mut ReviewBlock) -> bool) -> Vec<Event> {
        if self.phase != SlidePhase::Reviewing {
            return Vec::new();
        }
        let Some(review) = self.review.as_mut() else {
            return Vec::new();
        };
        if !step(review) {
            return Vec::new();
        }
        let position = review.position();
        let slide_index = review.current().map(|s| s.id).unwrap_or(position);
        vec![Event::ReviewNavigated {
            position,
            slide_index,
            at: self.now(),
        }]
    }
}
