pub mod ask;
pub mod config;
pub mod inspect;
pub mod study;

use std::path::Path;

use studypace_core::PdfDocument;

/// Open and validate a study document, logging what was loaded.
pub fn open_document(path: &Path) -> Result<PdfDocument, Box<dyn std::error::Error>> {
    let doc = PdfDocument::open(path)?;
    tracing::debug!(path = %path.display(), ?doc, "document loaded");
    Ok(doc)
}

/// Current-thread runtime for the async adapters.
pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
