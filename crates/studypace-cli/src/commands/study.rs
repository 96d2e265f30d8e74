use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use studypace_core::assistant::{Assistant, AssistantReply, GeminiAssistant, QuickAction};
use studypace_core::clock::{SharedClock, SystemClock};
use studypace_core::document::{slides_for, DocumentSource, PdfDocument, SizeHints};
use studypace_core::pacing::{Decision, PacingOrchestrator, PacingSettings, SlidePhase};
use studypace_core::session::{SessionStore, TimeAllocation};
use studypace_core::summary::{spawn_record, HttpSummarySink, SessionSummary, SummarySink};
use studypace_core::timer::ActivityKind;
use studypace_core::{Config, Event};

use crate::view;

const HELP: &str = "\
  <seconds> | easy | medium | hard   set this slide's time
  n / next                           next slide (or next in review)
  a / r / e                          after time is up: next, mark & next, extend
  r / review                         mark this slide for review
  p / prev, j N, f / finish          review navigation
  ask <question>                     ask the assistant about this slide
  explain | simplify | takeaways     quick assistant prompts
  d / dismiss                        dismiss the inactivity nudge
  s / status, h / help, q / quit";

/// How long to wait for the summary sink before exiting.
const SUMMARY_GRACE: Duration = Duration::from_secs(5);

#[derive(Args)]
pub struct StudyArgs {
    /// PDF to study
    pub file: PathBuf,
    /// Total study time in minutes
    #[arg(long)]
    pub minutes: Option<u64>,
    /// What you want to get out of the session
    #[arg(long)]
    pub goal: Option<String>,
    /// Do not send the session summary
    #[arg(long)]
    pub no_summary: bool,
    /// Print events as JSON lines instead of text
    #[arg(long)]
    pub events: bool,
    /// Wrap width for slide text
    #[arg(long, default_value = "80")]
    pub width: usize,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Time(TimeAllocation),
    Next,
    Prev,
    Advance,
    Review,
    Extend,
    /// 0-based position in the review block.
    Jump(usize),
    Finish,
    Ask(String),
    Quick(QuickAction),
    Dismiss,
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let input = match head.to_ascii_lowercase().as_str() {
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Prev,
        "a" | "advance" => Input::Advance,
        "r" | "review" | "mark" => Input::Review,
        "e" | "extend" => Input::Extend,
        "f" | "finish" => Input::Finish,
        "j" | "jump" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Input::Jump(n - 1),
            _ => Input::Unknown(line.to_string()),
        },
        "ask" if !rest.is_empty() => Input::Ask(rest.to_string()),
        "explain" => Input::Quick(QuickAction::Explain),
        "simplify" => Input::Quick(QuickAction::Simplify),
        "takeaways" => Input::Quick(QuickAction::KeyTakeaways),
        "d" | "dismiss" => Input::Dismiss,
        "s" | "status" => Input::Status,
        "h" | "help" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => match line.parse::<TimeAllocation>() {
            Ok(allocation) => Input::Time(allocation),
            Err(_) => Input::Unknown(line.to_string()),
        },
    };
    Some(input)
}

pub fn run(args: StudyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let doc = super::open_document(&args.file)?;

    let clock: SharedClock = Arc::new(SystemClock);
    let mut store = SessionStore::new(clock.clone());
    let minutes = args.minutes.unwrap_or(config.session.default_minutes);
    let goal = args
        .goal
        .unwrap_or_else(|| config.session.default_goal.clone());
    store.configure(minutes * 60, goal);
    store.load_slides(slides_for(&doc));
    let pacing = PacingOrchestrator::new(store, clock, PacingSettings::from(&config));

    let assistant: Option<Arc<dyn Assistant>> = match GeminiAssistant::from_config(&config.assistant)
    {
        Ok(assistant) => Some(Arc::new(assistant)),
        Err(e) => {
            tracing::warn!(error = %e, "assistant disabled");
            None
        }
    };
    let sink: Option<Arc<dyn SummarySink>> = if args.no_summary {
        None
    } else {
        HttpSummarySink::from_config(&config.summary).map(|s| Arc::new(s) as Arc<dyn SummarySink>)
    };

    let screen = StudyScreen {
        pacing,
        doc,
        assistant,
        json: args.events,
        width: args.width,
        status_shown: false,
    };
    let tick = Duration::from_millis(config.pacing.tick_ms.clamp(50, 500));
    super::runtime()?.block_on(screen.run(tick, sink))
}

enum Outcome {
    Finished(SessionSummary),
    Quit,
}

struct StudyScreen {
    pacing: PacingOrchestrator,
    doc: PdfDocument,
    assistant: Option<Arc<dyn Assistant>>,
    json: bool,
    width: usize,
    status_shown: bool,
}

impl StudyScreen {
    async fn run(
        mut self,
        tick: Duration,
        sink: Option<Arc<dyn SummarySink>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<AssistantReply>();

        let events = self.pacing.enter();
        let mut outcome = self.emit(events);

        while outcome.is_none() {
            tokio::select! {
                _ = ticker.tick() => {
                    let events = self.pacing.tick();
                    outcome = self.emit(events);
                    self.draw_status();
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        self.pacing.record_activity(ActivityKind::KeyPress);
                        if let Some(input) = parse_input(&line) {
                            outcome = self.handle(input, &reply_tx);
                        }
                    }
                    // stdin closed
                    None => outcome = Some(Outcome::Quit),
                },
                Some(reply) = reply_rx.recv() => {
                    self.clear_status();
                    println!("Assistant: {}", reply.text());
                }
            }
        }

        self.clear_status();
        match outcome {
            Some(Outcome::Finished(summary)) => {
                if let Some(sink) = sink {
                    let handle = spawn_record(sink, summary);
                    if tokio::time::timeout(SUMMARY_GRACE, handle).await.is_err() {
                        tracing::warn!("summary sink did not answer in time");
                    }
                }
            }
            Some(Outcome::Quit) | None => {
                let json = self.json;
                let event = self.pacing.exit();
                print_event(json, &event);
            }
        }
        Ok(())
    }

    fn handle(
        &mut self,
        input: Input,
        replies: &mpsc::UnboundedSender<AssistantReply>,
    ) -> Option<Outcome> {
        let phase = self.pacing.phase();
        let events = match input {
            Input::Time(allocation) => self.pacing.select_time(allocation),
            Input::Next if phase == SlidePhase::Reviewing => self.pacing.review_next(),
            Input::Next => self.pacing.next_slide(),
            Input::Prev => self.pacing.review_prev(),
            Input::Jump(position) => self.pacing.review_jump(position),
            Input::Finish => self.pacing.finish_review(),
            Input::Advance => self.pacing.decide(Decision::Advance),
            Input::Review if phase == SlidePhase::Expired => {
                self.pacing.decide(Decision::MarkForReviewAndAdvance)
            }
            Input::Review => self.pacing.mark_for_review(),
            Input::Extend => self.pacing.decide(Decision::Extend),
            Input::Ask(question) => {
                self.ask(question, replies);
                Vec::new()
            }
            Input::Quick(action) => {
                self.ask(action.prompt().to_string(), replies);
                Vec::new()
            }
            Input::Dismiss => {
                self.pacing.dismiss_boredom();
                Vec::new()
            }
            Input::Status => vec![self.pacing.snapshot()],
            Input::Help => {
                println!("{HELP}");
                Vec::new()
            }
            Input::Quit => return Some(Outcome::Quit),
            Input::Unknown(text) => {
                println!("Unknown command '{text}' (h for help)");
                Vec::new()
            }
        };
        self.emit(events)
    }

    /// Page index of the slide the user is looking at.
    fn visible_page(&self) -> Option<usize> {
        let slide = match self.pacing.review() {
            Some(review) => review.current(),
            None => self.pacing.current_slide(),
        }?;
        (slide.page_number as usize).checked_sub(1)
    }

    fn ask(&self, question: String, replies: &mpsc::UnboundedSender<AssistantReply>) {
        let Some(assistant) = self.assistant.clone() else {
            println!("Assistant: the assistant is not configured");
            return;
        };
        let context = self
            .visible_page()
            .and_then(|index| self.doc.page_text(index).ok())
            .unwrap_or_default();
        println!("Assistant: thinking...");
        let replies = replies.clone();
        tokio::spawn(async move {
            let reply = AssistantReply::from_result(assistant.ask(&context, &question).await);
            let _ = replies.send(reply);
        });
    }

    fn emit(&mut self, events: Vec<Event>) -> Option<Outcome> {
        let mut outcome = None;
        for event in events {
            self.clear_status();
            if let Event::SessionFinished { summary, .. } = &event {
                outcome = Some(Outcome::Finished(summary.clone()));
            }
            if self.json {
                print_event(true, &event);
                continue;
            }
            match &event {
                Event::SlideShown { slide_index, .. } => {
                    self.show_page(*slide_index);
                    println!("{}", view::time_menu(self.pacing.time_menu()));
                }
                Event::ReviewNavigated { .. } => {
                    print_event(false, &event);
                    if let Some(index) = self.visible_page() {
                        self.show_page(index);
                    }
                }
                Event::ReviewStarted { .. } => {
                    print_event(false, &event);
                    if let Some(index) = self.visible_page() {
                        self.show_page(index);
                    }
                }
                Event::StateSnapshot {
                    remaining_ms,
                    progress,
                    ..
                } => println!("{}", view::status_line(*remaining_ms, *progress)),
                other => print_event(false, other),
            }
        }
        outcome
    }

    fn show_page(&self, index: usize) {
        let hints = SizeHints {
            width_cols: self.width,
            max_lines: 0,
        };
        match self.doc.render_page(index, hints) {
            Ok(page) => {
                println!();
                for line in page.lines {
                    println!("{line}");
                }
            }
            Err(e) => println!("error: {e}"),
        }
    }

    fn draw_status(&mut self) {
        if self.json {
            return;
        }
        let Event::StateSnapshot {
            phase,
            remaining_ms,
            progress,
            ..
        } = self.pacing.snapshot()
        else {
            return;
        };
        if !matches!(phase, SlidePhase::Timing | SlidePhase::Reviewing) {
            return;
        }
        print!("\r{}", view::status_line(remaining_ms, progress));
        let _ = std::io::stdout().flush();
        self.status_shown = true;
    }

    fn clear_status(&mut self) {
        if self.status_shown {
            print!("\r\x1b[2K");
            let _ = std::io::stdout().flush();
            self.status_shown = false;
        }
    }
}

fn print_event(json: bool, event: &Event) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode event"),
        }
    } else if let Some(text) = view::describe(event) {
        println!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studypace_core::session::Difficulty;

    #[test]
    fn numbers_and_levels_select_time() {
        assert_eq!(
            parse_input("45"),
            Some(Input::Time(TimeAllocation::ExplicitSeconds(45)))
        );
        assert_eq!(
            parse_input("90s"),
            Some(Input::Time(TimeAllocation::ExplicitSeconds(90)))
        );
        assert_eq!(
            parse_input(" Hard "),
            Some(Input::Time(TimeAllocation::Named(Difficulty::Hard)))
        );
    }

    #[test]
    fn commands_and_arguments() {
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("n"), Some(Input::Next));
        assert_eq!(parse_input("j 3"), Some(Input::Jump(2)));
        assert!(matches!(parse_input("j 0"), Some(Input::Unknown(_))));
        assert_eq!(
            parse_input("ask what is preload?"),
            Some(Input::Ask("what is preload?".to_string()))
        );
        assert!(matches!(parse_input("ask"), Some(Input::Unknown(_))));
        assert_eq!(
            parse_input("takeaways"),
            Some(Input::Quick(QuickAction::KeyTakeaways))
        );
        assert_eq!(parse_input("quit"), Some(Input::Quit));
        assert!(matches!(parse_input("dance"), Some(Input::Unknown(_))));
    }
}
