//! Named session transitions and the reducer that applies them.
//!
//! `reduce` is total: every transition is defined for every state. A
//! transition that targets a slide that does not exist leaves the state
//! untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::allocation::{TimeAllocation, PANIC_THRESHOLD};
use super::state::{Session, Slide, SlideStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// Set or update the study budget and goal.
    SetConfig {
        total_time_budget_secs: u64,
        goal: String,
    },
    LoadSlides {
        slides: Vec<Slide>,
    },
    StartSession {
        slides: Option<Vec<Slide>>,
        total_time_budget_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    SetSlideTime {
        slide_id: usize,
        allocation: TimeAllocation,
    },
    Advance,
    UseExtension,
    MarkForReview {
        slide_id: usize,
    },
    RecordTimeSpent {
        slide_id: usize,
        secs: u64,
    },
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::SetConfig { .. } => "set_config",
            Transition::LoadSlides { .. } => "load_slides",
            Transition::StartSession { .. } => "start_session",
            Transition::SetSlideTime { .. } => "set_slide_time",
            Transition::Advance => "advance",
            Transition::UseExtension => "use_extension",
            Transition::MarkForReview { .. } => "mark_for_review",
            Transition::RecordTimeSpent { .. } => "record_time_spent",
        }
    }
}

/// Reset per-run fields and renumber by position.
fn normalize(slides: Vec<Slide>) -> Vec<Slide> {
    slides
        .into_iter()
        .enumerate()
        .map(|(index, slide)| Slide {
            id: index,
            status: SlideStatus::Pending,
            marked_for_review: false,
            time_spent_secs: 0,
            extensions: 0,
            ..slide
        })
        .collect()
}

fn update_slide(mut state: Session, slide_id: usize, f: impl FnOnce(&mut Slide)) -> Session {
    if let Some(slide) = state.slides.iter_mut().find(|s| s.id == slide_id) {
        f(slide);
    }
    state
}

pub fn reduce(state: &Session, transition: &Transition) -> Session {
    let mut next = state.clone();
    match transition {
        Transition::SetConfig {
            total_time_budget_secs,
            goal,
        } => {
            next.total_time_budget_secs = *total_time_budget_secs;
            next.goal = goal.clone();
            next.configured = true;
            next
        }
        Transition::LoadSlides { slides } => {
            next.slides = normalize(slides.clone());
            next.current_index = 0;
            next
        }
        Transition::StartSession {
            slides,
            total_time_budget_secs,
            at,
        } => {
            if let Some(slides) = slides {
                next.slides = normalize(slides.clone());
            }
            if let Some(budget) = total_time_budget_secs {
                next.total_time_budget_secs = *budget;
            }
            if next.started_at.is_none() {
                next.started_at = Some(*at);
            }
            next.active = true;
            next.configured = true;
            next.current_index = 0;
            next
        }
        Transition::SetSlideTime {
            slide_id,
            allocation,
        } => {
            let secs = allocation.resolve_secs(next.panic_mode);
            update_slide(next, *slide_id, |slide| {
                slide.allocation = Some(*allocation);
                slide.allocated_secs = Some(secs);
            })
        }
        Transition::Advance => {
            if next.slides.is_empty() {
                return next;
            }
            let index = next.current_index.min(next.slides.len() - 1);
            next.slides[index].status = SlideStatus::Completed;
            next.current_index = (index + 1).min(next.slides.len() - 1);
            next
        }
        Transition::UseExtension => {
            next.extensions_used = next.extensions_used.saturating_add(1);
            if next.extensions_used > PANIC_THRESHOLD {
                next.panic_mode = true;
            }
            if let Some(slide) = next.slides.get_mut(next.current_index) {
                slide.extensions = slide.extensions.saturating_add(1);
            }
            next
        }
        Transition::MarkForReview { slide_id } => update_slide(next, *slide_id, |slide| {
            if slide.status != SlideStatus::Completed {
                slide.status = SlideStatus::Review;
            }
            slide.marked_for_review = true;
        }),
        Transition::RecordTimeSpent { slide_id, secs } => {
            update_slide(next, *slide_id, |slide| {
                slide.time_spent_secs = slide.time_spent_secs.saturating_add(*secs);
            })
        }
    }
}
