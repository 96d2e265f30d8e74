use std::path::PathBuf;

use clap::Args;
use studypace_core::document::{slides_for, DocumentSource, SizeHints};

#[derive(Args)]
pub struct InspectArgs {
    /// PDF to inspect
    pub file: PathBuf,
    /// Render one page (1-based) instead of the overview
    #[arg(long)]
    pub page: Option<usize>,
    /// Wrap width in columns
    #[arg(long, default_value = "80")]
    pub width: usize,
    /// Print the slide list as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = super::open_document(&args.file)?;

    if let Some(page) = args.page {
        let index = page
            .checked_sub(1)
            .ok_or("pages are numbered from 1")?;
        let hints = SizeHints {
            width_cols: args.width,
            max_lines: 0,
        };
        for line in doc.render_page(index, hints)?.lines {
            println!("{line}");
        }
        return Ok(());
    }

    let slides = slides_for(&doc);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&slides)?);
    } else {
        println!("{}: {} slides", args.file.display(), slides.len());
    }
    Ok(())
}
