use std::path::PathBuf;

use clap::Args;
use studypace_core::assistant::{Assistant, AssistantReply, GeminiAssistant, QuickAction};
use studypace_core::document::DocumentSource;
use studypace_core::Config;

#[derive(Args)]
pub struct AskArgs {
    /// PDF the question is about
    pub file: PathBuf,
    /// Page to use as context (1-based)
    #[arg(long)]
    pub page: usize,
    /// Canned question: explain, simplify or takeaways
    #[arg(long)]
    pub quick: Option<QuickAction>,
    /// Free-form question
    pub question: Vec<String>,
}

pub fn run(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let question = match (args.quick, args.question.is_empty()) {
        (Some(action), _) => action.prompt().to_string(),
        (None, false) => args.question.join(" "),
        (None, true) => return Err("ask needs a QUESTION or --quick".into()),
    };

    let doc = super::open_document(&args.file)?;
    let index = args.page.checked_sub(1).ok_or("pages are numbered from 1")?;
    let context = doc.page_text(index).or_else(|e| match e {
        studypace_core::DocumentError::TextExtraction { .. } => Ok(String::new()),
        other => Err(other),
    })?;

    let config = Config::load_or_default();
    let assistant = GeminiAssistant::from_config(&config.assistant)?;
    let reply = super::runtime()?
        .block_on(async { AssistantReply::from_result(assistant.ask(&context, &question).await) });

    match reply {
        AssistantReply::Answer(text) => println!("{text}"),
        AssistantReply::Notice(text) => eprintln!("{text}"),
    }
    Ok(())
}
