use crate::clock::SharedClock;

use super::state::{Session, Slide};
use super::transition::{reduce, Transition};

/// Owns the [`Session`] for one study run. The only way to change it is
/// `dispatch`, which applies transitions one at a time in issue order.
pub struct SessionStore {
    clock: SharedClock,
    session: Session,
    applied: usize,
}

impl SessionStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            session: Session::new(),
            applied: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of transitions applied since the store was created or reset.
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn dispatch(&mut self, transition: Transition) -> &Session {
        self.session = reduce(&self.session, &transition);
        self.applied += 1;
        tracing::debug!(
            transition = transition.name(),
            current_index = self.session.current_index,
            extensions_used = self.session.extensions_used,
            panic_mode = self.session.panic_mode,
            "session transition applied"
        );
        &self.session
    }

    pub fn configure(&mut self, total_time_budget_secs: u64, goal: impl Into<String>) {
        self.dispatch(Transition::SetConfig {
            total_time_budget_secs,
            goal: goal.into(),
        });
    }

    pub fn load_slides(&mut self, slides: Vec<Slide>) {
        self.dispatch(Transition::LoadSlides { slides });
    }

    /// `StartSession` stamped with the store's clock.
    pub fn start(&mut self, slides: Option<Vec<Slide>>, total_time_budget_secs: Option<u64>) {
        let at = self.clock.now_utc();
        self.dispatch(Transition::StartSession {
            slides,
            total_time_budget_secs,
            at,
        });
    }

    /// Discard the current run and begin an empty one.
    pub fn reset(&mut self) {
        tracing::info!(session_id = %self.session.id, "session discarded");
        self.session = Session::new();
        self.applied = 0;
    }
}
