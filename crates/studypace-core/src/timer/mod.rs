mod countdown;
mod inactivity;

pub use countdown::{format_mm_ss, Countdown, CountdownState};
pub use inactivity::{ActivityKind, InactivityDetector};
