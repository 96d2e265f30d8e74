//! Session state: slides, position, extensions and panic mode, changed only
//! through [`Transition`]s.

pub mod allocation;
mod state;
mod store;
mod transition;

pub use allocation::{
    Difficulty, ParseAllocationError, TimeAllocation, EXTENSION_LIMIT, EXTENSION_SECS,
    FALLBACK_SECS, PANIC_THRESHOLD,
};
pub use state::{slides_from_page_count, Session, Slide, SlideStatus};
pub use store::SessionStore;
pub use transition::{reduce, Transition};
