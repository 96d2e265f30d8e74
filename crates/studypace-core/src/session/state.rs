use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::allocation::{TimeAllocation, EXTENSION_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideStatus {
    Pending,
    Completed,
    /// Flagged while on screen; replaced by `Completed` on advance.
    Review,
}

/// One page of the study document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Position in the slide list.
    pub id: usize,
    /// 1-based page number in the source document.
    pub page_number: u32,
    pub status: SlideStatus,
    /// Survives the switch to `Completed` so the summary can count it.
    #[serde(default)]
    pub marked_for_review: bool,
    #[serde(default)]
    pub allocation: Option<TimeAllocation>,
    #[serde(default)]
    pub allocated_secs: Option<u64>,
    #[serde(default)]
    pub time_spent_secs: u64,
    #[serde(default)]
    pub extensions: u32,
}

impl Slide {
    pub fn for_page(page_number: u32) -> Self {
        Self {
            id: page_number.saturating_sub(1) as usize,
            page_number,
            status: SlideStatus::Pending,
            marked_for_review: false,
            allocation: None,
            allocated_secs: None,
            time_spent_secs: 0,
            extensions: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SlideStatus::Completed
    }
}

/// One slide per page, in page order.
pub fn slides_from_page_count(page_count: usize) -> Vec<Slide> {
    (1..=page_count as u32).map(Slide::for_page).collect()
}

/// State of one study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub configured: bool,
    pub active: bool,
    /// Advisory only; pacing never enforces it.
    pub total_time_budget_secs: u64,
    pub goal: String,
    pub slides: Vec<Slide>,
    pub current_index: usize,
    pub extensions_used: u32,
    pub panic_mode: bool,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            configured: false,
            active: false,
            total_time_budget_secs: 0,
            goal: String::new(),
            slides: Vec::new(),
            current_index: 0,
            extensions_used: 0,
            panic_mode: false,
            started_at: None,
        }
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current_index)
    }

    pub fn slide(&self, id: usize) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn is_last_slide(&self) -> bool {
        !self.slides.is_empty() && self.current_index + 1 >= self.slides.len()
    }

    pub fn slides_completed(&self) -> usize {
        self.slides.iter().filter(|s| s.is_completed()).count()
    }

    pub fn slides_marked_for_review(&self) -> usize {
        self.slides.iter().filter(|s| s.marked_for_review).count()
    }

    pub fn extensions_remaining(&self) -> u32 {
        EXTENSION_LIMIT.saturating_sub(self.extensions_used)
    }
}
