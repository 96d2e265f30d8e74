//! Integration tests for full study sessions.
//!
//! These drive the orchestrator with a manual clock the way the CLI does,
//! ticking every 250ms, and check the events and final session state.

use std::sync::Arc;
use std::time::Duration;

use studypace_core::pacing::{Decision, PacingOrchestrator, PacingSettings, ReviewEndReason, SlidePhase};
use studypace_core::session::{slides_from_page_count, Difficulty, SessionStore, TimeAllocation, Transition};
use studypace_core::timer::Countdown;
use studypace_core::{Event, ManualClock, Route};

const START_MS: u64 = 1_700_000_000_000;

fn session(pages: usize) -> (Arc<ManualClock>, PacingOrchestrator) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let mut store = SessionStore::new(clock.clone());
    store.configure(3600, "Pharmacology block 2");
    store.load_slides(slides_from_page_count(pages));
    let mut pacing = PacingOrchestrator::new(store, clock.clone(), PacingSettings::default());
    let events = pacing.enter();
    assert!(matches!(events[0], Event::SessionStarted { .. }));
    (clock, pacing)
}

fn run_for(clock: &ManualClock, pacing: &mut PacingOrchestrator, secs: u64) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..secs * 4 {
        clock.advance_ms(250);
        events.extend(pacing.tick());
    }
    events
}

fn kinds(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::kind).collect()
}

#[test]
fn test_countdown_does_not_drift_with_missed_ticks() {
    let clock = Arc::new(ManualClock::new(START_MS));
    let mut countdown = Countdown::new(clock.clone(), Duration::from_secs(120));
    countdown.start();

    // One tick in the middle of a minute-long gap.
    clock.advance_secs(37);
    assert!(!countdown.tick());
    clock.advance_secs(23);
    countdown.pause();
    assert_eq!(countdown.remaining(), Duration::from_secs(60));

    // Start while running does not re-anchor.
    assert!(countdown.start());
    clock.advance_secs(10);
    assert!(!countdown.start());
    assert_eq!(countdown.remaining(), Duration::from_secs(50));
}

#[test]
fn test_review_block_after_five_advances() {
    let (clock, mut pacing) = session(8);
    let mut events = Vec::new();
    for _ in 0..5 {
        pacing.select_time(TimeAllocation::ExplicitSeconds(30));
        clock.advance_secs(5);
        events.extend(pacing.next_slide());
    }

    let started = events
        .iter()
        .find_map(|e| match e {
            Event::ReviewStarted { slide_indices, duration_secs, .. } => {
                Some((slide_indices.clone(), *duration_secs))
            }
            _ => None,
        })
        .expect("review block should start");
    assert_eq!(started, (vec![0, 1, 2, 3, 4], 300));
    assert_eq!(pacing.phase(), SlidePhase::Reviewing);
    assert_eq!(pacing.session().current_index, 5);

    // A sixth advance is blocked while reviewing.
    assert!(pacing.next_slide().is_empty());
    assert!(pacing.select_time(TimeAllocation::ExplicitSeconds(30)).is_empty());
    assert_eq!(pacing.session().current_index, 5);

    // Free navigation within the block.
    assert!(!pacing.review_jump(2).is_empty());
    assert!(!pacing.review_next().is_empty());
    assert_eq!(pacing.review().map(|r| r.position()), Some(3));

    let events = pacing.finish_review();
    assert_eq!(kinds(&events), vec!["review_finished", "slide_shown"]);
    match &events[0] {
        Event::ReviewFinished { reason, visited, total, .. } => {
            assert_eq!(*reason, ReviewEndReason::Finished);
            assert_eq!(*visited, 3);
            assert_eq!(*total, 5);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    // Continues at the next unseen slide without skipping one.
    assert!(matches!(events[1], Event::SlideShown { slide_index: 5, page_number: 6, .. }));
    assert_eq!(pacing.phase(), SlidePhase::AwaitingDifficulty);
    assert_eq!(pacing.block_advances(), 0);
}

#[test]
fn test_review_block_times_out() {
    let (clock, mut pacing) = session(6);
    for _ in 0..5 {
        pacing.select_time(TimeAllocation::Named(Difficulty::Easy));
        pacing.next_slide();
    }
    assert_eq!(pacing.phase(), SlidePhase::Reviewing);

    let events = run_for(&clock, &mut pacing, 299);
    assert!(events.is_empty());
    let events = run_for(&clock, &mut pacing, 1);
    assert!(matches!(
        events[0],
        Event::ReviewFinished { reason: ReviewEndReason::TimedOut, .. }
    ));
    assert_eq!(pacing.session().current_index, 5);
    assert_eq!(pacing.phase(), SlidePhase::AwaitingDifficulty);
}

#[test]
fn test_last_slide_finishes_without_review() {
    // Exactly five slides: the fifth advance ends the session instead.
    let (_clock, mut pacing) = session(5);
    let mut events = Vec::new();
    for _ in 0..5 {
        pacing.select_time(TimeAllocation::ExplicitSeconds(15));
        events.extend(pacing.next_slide());
    }
    assert!(events.iter().all(|e| !matches!(e, Event::ReviewStarted { .. })));
    assert_eq!(pacing.phase(), SlidePhase::Finished);
    assert_eq!(pacing.route(), Route::Summary);
    assert_eq!(pacing.session().slides_completed(), 5);
    assert_eq!(pacing.session().current_index, 4);
}

#[test]
fn test_hard_difficulty_with_and_without_panic() {
    let (_clock, mut pacing) = session(3);
    let events = pacing.select_time(TimeAllocation::Named(Difficulty::Hard));
    assert!(matches!(
        events[0],
        Event::SlideTimeAllocated { allocated_secs: 240, panic_mode: false, .. }
    ));

    for _ in 0..4 {
        pacing.store_mut().dispatch(Transition::UseExtension);
    }
    assert!(pacing.session().panic_mode);

    let events = pacing.select_time(TimeAllocation::Named(Difficulty::Hard));
    assert!(matches!(
        events[0],
        Event::SlideTimeAllocated { allocated_secs: 192, panic_mode: true, .. }
    ));
    assert_eq!(pacing.remaining(), Duration::from_secs(192));
}

#[test]
fn test_two_slide_session_end_to_end() {
    let (clock, mut pacing) = session(2);

    // Slide 1: 30s, let it run out, flag it and move on.
    pacing.select_time(TimeAllocation::ExplicitSeconds(30));
    let events = run_for(&clock, &mut pacing, 30);
    assert_eq!(kinds(&events), vec!["timer_expired", "decision_required"]);
    let prompt = pacing.decision_prompt().expect("decision prompt");
    assert!(prompt.offers(Decision::Extend));
    assert_eq!(prompt.extensions_remaining, 3);

    let events = pacing.decide(Decision::MarkForReviewAndAdvance);
    assert_eq!(
        kinds(&events),
        vec!["slide_marked_for_review", "slide_advanced", "slide_shown"]
    );

    // Slide 2: 45s, manual next before it runs out.
    pacing.select_time(TimeAllocation::ExplicitSeconds(45));
    let events = run_for(&clock, &mut pacing, 20);
    assert!(events.is_empty());
    let events = pacing.next_slide();
    assert_eq!(kinds(&events), vec!["slide_advanced", "session_finished"]);

    let Event::SessionFinished { summary, .. } = &events[1] else {
        panic!("expected session_finished");
    };
    assert_eq!(summary.slides_total, 2);
    assert_eq!(summary.slides_completed, 2);
    assert_eq!(summary.slides_marked_for_review, 1);
    assert_eq!(summary.extensions_used, 0);
    assert!(!summary.panic_mode);
    assert_eq!(summary.time_spent_minutes, 0);

    let session = pacing.session();
    assert!(session.slides[0].marked_for_review);
    assert_eq!(session.slides[0].time_spent_secs, 30);
    assert_eq!(session.slides[1].time_spent_secs, 20);
    assert_eq!(pacing.route(), Route::Summary);

    // Nothing moves after the session is over.
    assert!(run_for(&clock, &mut pacing, 60).is_empty());
    assert!(pacing.next_slide().is_empty());
}

#[test]
fn test_boredom_nudge_leaves_timer_running() {
    let (clock, mut pacing) = session(2);
    pacing.select_time(TimeAllocation::ExplicitSeconds(90));

    let events = run_for(&clock, &mut pacing, 60);
    assert_eq!(kinds(&events), vec!["boredom_detected"]);
    assert_eq!(pacing.remaining(), Duration::from_secs(30));
    pacing.dismiss_boredom();
    assert!(!pacing.boredom_alert());

    // The rest of the slide runs out normally.
    let events = run_for(&clock, &mut pacing, 30);
    assert!(events.iter().any(|e| matches!(e, Event::TimerExpired { .. })));
}

#[test]
fn test_disabled_boredom_never_fires() {
    let clock = Arc::new(ManualClock::new(START_MS));
    let mut store = SessionStore::new(clock.clone());
    store.load_slides(slides_from_page_count(2));
    let settings = PacingSettings {
        boredom_enabled: false,
        ..PacingSettings::default()
    };
    let mut pacing = PacingOrchestrator::new(store, clock.clone(), settings);
    pacing.enter();
    pacing.select_time(TimeAllocation::ExplicitSeconds(120));
    let events = run_for(&clock, &mut pacing, 110);
    assert!(events.is_empty());
}

#[test]
fn test_snapshot_serializes_for_front_ends() {
    let (clock, mut pacing) = session(3);
    pacing.select_time(TimeAllocation::ExplicitSeconds(60));
    clock.advance_secs(15);
    let json = serde_json::to_value(pacing.snapshot()).unwrap();
    assert_eq!(json["type"], "state_snapshot");
    assert_eq!(json["phase"], "timing");
    assert_eq!(json["remaining_ms"], 45_000);
    assert_eq!(json["total_ms"], 60_000);
}
