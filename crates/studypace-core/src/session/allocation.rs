//! Per-slide time allocation.
//!
//! A slide's time comes either from a named difficulty level or from an
//! explicit number of seconds picked off the time menu. Both resolve to
//! seconds through [`TimeAllocation::resolve_secs`], which is also where
//! panic mode takes its 20%.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extensions offered per session.
pub const EXTENSION_LIMIT: u32 = 3;
/// Panic mode switches on once `extensions_used` exceeds this.
pub const PANIC_THRESHOLD: u32 = 3;
/// Seconds added by one extension.
pub const EXTENSION_SECS: u64 = 60;
/// Used when no level or explicit time is given.
pub const FALLBACK_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn base_secs(self) -> u64 {
        match self {
            Difficulty::Easy => 45,
            Difficulty::Medium => 120,
            Difficulty::Hard => 240,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TimeAllocation {
    Named(Difficulty),
    ExplicitSeconds(u64),
    /// Selection cleared; falls back to [`FALLBACK_SECS`].
    Unspecified,
}

impl TimeAllocation {
    pub fn base_secs(&self) -> u64 {
        match self {
            TimeAllocation::Named(level) => level.base_secs(),
            TimeAllocation::ExplicitSeconds(secs) => *secs,
            TimeAllocation::Unspecified => FALLBACK_SECS,
        }
    }

    /// Seconds to put on the countdown. Panic mode keeps 80%, floored.
    pub fn resolve_secs(&self, panic_mode: bool) -> u64 {
        let base = self.base_secs();
        if panic_mode {
            base.saturating_mul(4) / 5
        } else {
            base
        }
    }
}

impl fmt::Display for TimeAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeAllocation::Named(level) => f.write_str(level.as_str()),
            TimeAllocation::ExplicitSeconds(secs) => write!(f, "{secs}s"),
            TimeAllocation::Unspecified => f.write_str("default"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a difficulty (easy, medium, hard) or a number of seconds")]
pub struct ParseAllocationError(pub String);

impl FromStr for TimeAllocation {
    type Err = ParseAllocationError;

    /// Accepts `easy`/`medium`/`hard`, `90` or `90s`, and an empty string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        match trimmed.as_str() {
            "" | "default" => return Ok(TimeAllocation::Unspecified),
            "easy" => return Ok(TimeAllocation::Named(Difficulty::Easy)),
            "medium" => return Ok(TimeAllocation::Named(Difficulty::Medium)),
            "hard" => return Ok(TimeAllocation::Named(Difficulty::Hard)),
            _ => {}
        }
        let digits = trimmed.strip_suffix('s').unwrap_or(&trimmed);
        digits
            .parse::<u64>()
            .map(TimeAllocation::ExplicitSeconds)
            .map_err(|_| ParseAllocationError(s.to_string()))
    }
}
