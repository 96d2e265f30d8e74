use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pacing::{DecisionPrompt, ReviewEndReason, SlidePhase};
use crate::summary::SessionSummary;

/// Every state change in a study session produces an Event.
/// Front ends render from them; the CLI prints them as JSON in `--events` mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: String,
        slides_total: usize,
        goal: String,
        at: DateTime<Utc>,
    },
    /// A slide is on screen and waiting for a time selection.
    SlideShown {
        slide_index: usize,
        page_number: u32,
        at: DateTime<Utc>,
    },
    SlideTimeAllocated {
        slide_index: usize,
        allocated_secs: u64,
        panic_mode: bool,
        at: DateTime<Utc>,
    },
    TimerStarted {
        slide_index: usize,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerExpired {
        slide_index: usize,
        at: DateTime<Utc>,
    },
    /// The blocking decision overlay is up.
    DecisionRequired {
        prompt: DecisionPrompt,
        at: DateTime<Utc>,
    },
    ExtensionUsed {
        slide_index: usize,
        extensions_used: u32,
        extensions_remaining: u32,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PanicModeEntered {
        extensions_used: u32,
        at: DateTime<Utc>,
    },
    SlideMarkedForReview {
        slide_index: usize,
        at: DateTime<Utc>,
    },
    SlideAdvanced {
        from_index: usize,
        to_index: usize,
        time_spent_secs: u64,
        at: DateTime<Utc>,
    },
    ReviewStarted {
        slide_indices: Vec<usize>,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    ReviewNavigated {
        position: usize,
        slide_index: usize,
        at: DateTime<Utc>,
    },
    ReviewFinished {
        reason: ReviewEndReason,
        visited: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    /// Non-blocking encouragement; the timer keeps running.
    BoredomDetected {
        slide_index: usize,
        idle_secs: u64,
        at: DateTime<Utc>,
    },
    SessionFinished {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
    SessionExited {
        slides_completed: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: SlidePhase,
        slide_index: usize,
        slides_total: usize,
        remaining_ms: u64,
        total_ms: u64,
        progress: f64,
        extensions_used: u32,
        panic_mode: bool,
        boredom_alert: bool,
        block_advances: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::SlideShown { .. } => "slide_shown",
            Event::SlideTimeAllocated { .. } => "slide_time_allocated",
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerExpired { .. } => "timer_expired",
            Event::DecisionRequired { .. } => "decision_required",
            Event::ExtensionUsed { .. } => "extension_used",
            Event::PanicModeEntered { .. } => "panic_mode_entered",
            Event::SlideMarkedForReview { .. } => "slide_marked_for_review",
            Event::SlideAdvanced { .. } => "slide_advanced",
            Event::ReviewStarted { .. } => "review_started",
            Event::ReviewNavigated { .. } => "review_navigated",
            Event::ReviewFinished { .. } => "review_finished",
            Event::BoredomDetected { .. } => "boredom_detected",
            Event::SessionFinished { .. } => "session_finished",
            Event::SessionExited { .. } => "session_exited",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
