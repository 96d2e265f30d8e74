//! # Studypace Core Library
//!
//! Core logic for studypace, a timed study-pacing engine. A study document is
//! split into slides, each slide gets a time allocation, and a countdown
//! forces a decision (move on, flag for review, or extend) when it runs out.
//! Every few slides a timed review block revisits the recent ones.
//!
//! ## Architecture
//!
//! - **Timers**: wall-clock countdown and inactivity detector driven by the
//!   caller's `tick()`; no background threads
//! - **Session**: a single-writer store applying named transitions through a
//!   pure reducer
//! - **Pacing**: the orchestrator tying timers, store and review blocks
//!   together and reporting [`Event`]s
//! - **Adapters**: PDF documents, the study assistant and the summary sink
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PacingOrchestrator`]: per-slide state machine
//! - [`SessionStore`]: session state and transitions
//! - [`Countdown`]: drift-resistant countdown
//! - [`Config`]: application configuration management

pub mod assistant;
pub mod clock;
pub mod document;
pub mod error;
pub mod events;
pub mod pacing;
pub mod session;
pub mod storage;
pub mod summary;
pub mod timer;

pub use assistant::{Assistant, AssistantReply, GeminiAssistant, QuickAction};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use document::{DocumentSource, PdfDocument, RenderedPage, SizeHints};
pub use error::{AssistantError, ConfigError, CoreError, DocumentError, SummaryError, UploadError};
pub use events::Event;
pub use pacing::{Decision, PacingOrchestrator, PacingSettings, Route, SlidePhase};
pub use session::{Session, SessionStore, Slide, TimeAllocation, Transition};
pub use storage::Config;
pub use summary::{SessionSummary, SummarySink};
pub use timer::{ActivityKind, Countdown, InactivityDetector};
