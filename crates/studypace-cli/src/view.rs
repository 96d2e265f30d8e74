//! Terminal rendering of pacing events.

use studypace_core::pacing::{Decision, DecisionPrompt, ReviewEndReason};
use studypace_core::timer::format_mm_ss;
use studypace_core::{Event, SessionSummary};

const BAR_WIDTH: usize = 30;

/// One or more lines for an event; `None` for events that only feed the
/// status line.
pub fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::SessionStarted {
            slides_total, goal, ..
        } => {
            if goal.is_empty() {
                format!("Session started: {slides_total} slides")
            } else {
                format!("Session started: {slides_total} slides. Goal: {goal}")
            }
        }
        Event::SlideShown { .. } => return None,
        Event::SlideTimeAllocated {
            allocated_secs,
            panic_mode,
            ..
        } => {
            let mut line = format!("Time set: {}", format_secs(*allocated_secs));
            if *panic_mode {
                line.push_str(" (panic mode: times cut by 20%)");
            }
            line
        }
        Event::TimerStarted { .. } => return None,
        Event::TimerExpired { .. } => "Time to Move On".to_string(),
        Event::DecisionRequired { prompt, .. } => describe_prompt(prompt),
        Event::ExtensionUsed {
            extensions_remaining,
            remaining_secs,
            ..
        } => format!(
            "Extended: {} on the clock, {extensions_remaining} extensions left",
            format_secs(*remaining_secs)
        ),
        Event::PanicModeEntered { .. } => {
            "Panic mode: slide times are now cut by 20%".to_string()
        }
        Event::SlideMarkedForReview { slide_index, .. } => {
            format!("Slide {} marked for review", slide_index + 1)
        }
        Event::SlideAdvanced { .. } => return None,
        Event::ReviewStarted {
            slide_indices,
            duration_secs,
            ..
        } => {
            let pages: Vec<String> = slide_indices.iter().map(|i| (i + 1).to_string()).collect();
            format!(
                "Review time: {} to revisit slides {}\n  [n]ext [p]rev [j N] jump [f]inish",
                format_secs(*duration_secs),
                pages.join(", ")
            )
        }
        Event::ReviewNavigated {
            position,
            slide_index,
            ..
        } => format!("Review {}: slide {}", position + 1, slide_index + 1),
        Event::ReviewFinished {
            reason,
            visited,
            total,
            ..
        } => match reason {
            ReviewEndReason::Finished => format!("Review finished ({visited}/{total} slides seen)"),
            ReviewEndReason::TimedOut => {
                format!("Review time is up ({visited}/{total} slides seen)")
            }
        },
        Event::BoredomDetected { .. } => {
            "Still with us? A quick question to the assistant can help ([d] to dismiss)".to_string()
        }
        Event::SessionFinished { summary, .. } => describe_summary(summary),
        Event::SessionExited {
            slides_completed, ..
        } => format!("Session ended after {slides_completed} slides"),
        Event::StateSnapshot { .. } => return None,
    };
    Some(text)
}

fn describe_prompt(prompt: &DecisionPrompt) -> String {
    let options: Vec<String> = prompt
        .choices
        .iter()
        .map(|choice| match choice {
            Decision::Advance => format!("[a] {}", choice.label()),
            Decision::MarkForReviewAndAdvance => format!("[r] {}", choice.label()),
            Decision::Extend => format!(
                "[e] Extend ({} min) - {} left",
                prompt.extension_secs / 60,
                prompt.extensions_remaining
            ),
        })
        .collect();
    let mut text = format!("  {}", options.join("   "));
    if let Some(notice) = &prompt.notice {
        text.push_str("\n  ");
        text.push_str(notice);
    }
    text
}

pub fn describe_summary(summary: &SessionSummary) -> String {
    let mut lines = vec![
        "Session complete".to_string(),
        format!("  Time spent:        {} min", summary.time_spent_minutes),
        format!(
            "  Slides completed:  {}/{}",
            summary.slides_completed, summary.slides_total
        ),
        format!("  Marked for review: {}", summary.slides_marked_for_review),
        format!("  Extensions used:   {}", summary.extensions_used),
    ];
    if !summary.goal.is_empty() {
        lines.insert(1, format!("  Goal:              {}", summary.goal));
    }
    if summary.panic_mode {
        lines.push("  Panic mode was on".to_string());
    }
    lines.join("\n")
}

/// `12:34 [#########-----]`
pub fn status_line(remaining_ms: u64, progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "{} [{}{}]",
        format_mm_ss(std::time::Duration::from_millis(remaining_ms)),
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

pub fn time_menu(menu: &[u64]) -> String {
    let options: Vec<String> = menu.iter().map(|s| format_secs(*s)).collect();
    format!(
        "  How long for this slide? {} (or easy/medium/hard)",
        options.join(" | ")
    )
}

fn format_secs(secs: u64) -> String {
    if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else if secs > 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
