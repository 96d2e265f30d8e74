use serde::{Deserialize, Serialize};

use crate::session::{Session, EXTENSION_LIMIT, EXTENSION_SECS};

pub const NO_EXTENSIONS_NOTICE: &str = "No extensions left. Panic prevention active.";

/// What the user may do once a slide's time is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Advance,
    MarkForReviewAndAdvance,
    Extend,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::Advance => "Next slide",
            Decision::MarkForReviewAndAdvance => "Mark for review & move on",
            Decision::Extend => "Extend (1 min)",
        }
    }
}

/// The blocking "time to move on" overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPrompt {
    pub slide_index: usize,
    pub choices: Vec<Decision>,
    pub extensions_used: u32,
    pub extensions_remaining: u32,
    pub extension_secs: u64,
    /// Set when the extend choice was withheld.
    pub notice: Option<String>,
}

impl DecisionPrompt {
    pub fn for_session(session: &Session) -> Self {
        let remaining = EXTENSION_LIMIT.saturating_sub(session.extensions_used);
        let mut choices = vec![Decision::Advance, Decision::MarkForReviewAndAdvance];
        let notice = if remaining > 0 {
            choices.push(Decision::Extend);
            None
        } else {
            Some(NO_EXTENSIONS_NOTICE.to_string())
        };
        Self {
            slide_index: session.current_index,
            choices,
            extensions_used: session.extensions_used,
            extensions_remaining: remaining,
            extension_secs: EXTENSION_SECS,
            notice,
        }
    }

    pub fn offers(&self, decision: Decision) -> bool {
        self.choices.contains(&decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_offered_while_extensions_remain() {
        let mut session = Session::new();
        session.extensions_used = 2;
        let prompt = DecisionPrompt::for_session(&session);
        assert!(prompt.offers(Decision::Extend));
        assert_eq!(prompt.extensions_remaining, 1);
        assert!(prompt.notice.is_none());
    }

    #[test]
    fn exhausted_extensions_are_called_out() {
        let mut session = Session::new();
        session.extensions_used = 3;
        let prompt = DecisionPrompt::for_session(&session);
        assert_eq!(
            prompt.choices,
            vec![Decision::Advance, Decision::MarkForReviewAndAdvance]
        );
        assert_eq!(prompt.notice.as_deref(), Some(NO_EXTENSIONS_NOTICE));
    }
}
