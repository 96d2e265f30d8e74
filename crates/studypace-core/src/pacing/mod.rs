//! Slide pacing: the per-slide state machine, the decision prompt and the
//! periodic review block.

mod decision;
mod orchestrator;
mod review;
mod settings;

pub use decision::{Decision, DecisionPrompt, NO_EXTENSIONS_NOTICE};
pub use orchestrator::{PacingOrchestrator, Route, SlidePhase};
pub use review::{ReviewBlock, ReviewEndReason, DEFAULT_REVIEW_BLOCK, DEFAULT_REVIEW_EVERY};
pub use settings::{PacingSettings, DEFAULT_BOREDOM_TIMEOUT, DEFAULT_TIME_MENU_SECS};
