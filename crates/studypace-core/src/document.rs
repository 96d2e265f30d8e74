//! Study documents: upload validation, page access and terminal rendering.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document, ObjectId};

use crate::error::{CoreError, DocumentError, UploadError};
use crate::session::{slides_from_page_count, Slide};

/// Layout hints from the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHints {
    pub width_cols: usize,
    pub max_lines: usize,
}

impl Default for SizeHints {
    fn default() -> Self {
        Self {
            width_cols: 80,
            max_lines: 24,
        }
    }
}

/// One page laid out as terminal lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// 1-based.
    pub page_number: u32,
    pub lines: Vec<String>,
}

/// Source of pages for a session. Indices are 0-based.
pub trait DocumentSource {
    fn page_count(&self) -> usize;

    fn page_text(&self, index: usize) -> Result<String, DocumentError>;

    fn render_page(&self, index: usize, hints: SizeHints) -> Result<RenderedPage, DocumentError> {
        let count = self.page_count();
        if index >= count {
            return Err(DocumentError::PageOutOfRange { index, count });
        }
        let page_number = index as u32 + 1;
        let width = hints.width_cols.max(20);
        let mut lines = vec![format!("── Page {page_number} of {count} ──")];

        match self.page_text(index) {
            Ok(text) if !text.trim().is_empty() => lines.extend(wrap_text(&text, width)),
            Ok(_) => lines.push("(this page has no extractable text)".to_string()),
            Err(e) => {
                tracing::debug!(page = page_number, error = %e, "text extraction failed");
                lines.push("(this page has no extractable text)".to_string());
            }
        }

        if hints.max_lines > 0 && lines.len() > hints.max_lines {
            lines.truncate(hints.max_lines.saturating_sub(1).max(1));
            lines.push("…".to_string());
        }
        Ok(RenderedPage { page_number, lines })
    }
}

/// A PDF loaded fully into memory.
pub struct PdfDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl PdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self, DocumentError> {
        let doc = Document::load_mem(bytes).map_err(|e| DocumentError::Load(e.to_string()))?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(DocumentError::NoPages);
        }
        Ok(Self { doc, pages })
    }

    /// Read, validate and parse a file from disk.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        load_upload(&name, &bytes)
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, DocumentError> {
        let count = self.pages.len();
        let page_number = self
            .pages
            .keys()
            .nth(index)
            .copied()
            .ok_or(DocumentError::PageOutOfRange { index, count })?;
        self.doc
            .extract_text(&[page_number])
            .map_err(|e| DocumentError::TextExtraction {
                page: page_number,
                message: e.to_string(),
            })
    }
}

/// Accepts exactly one PDF: `.pdf` extension and a `%PDF-` header.
pub fn validate_upload(file_name: &str, bytes: &[u8]) -> Result<(), UploadError> {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let file_name = file_name.to_string();

    match extension.as_str() {
        "pdf" => {}
        "ppt" | "pptx" => return Err(UploadError::ConvertToPdf { file_name }),
        _ => return Err(UploadError::Unsupported { file_name }),
    }
    if bytes.is_empty() {
        return Err(UploadError::Empty { file_name });
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(UploadError::NotAPdf { file_name });
    }
    Ok(())
}

/// Validate then parse. Nothing is created when either step fails.
pub fn load_upload(file_name: &str, bytes: &[u8]) -> Result<PdfDocument, CoreError> {
    validate_upload(file_name, bytes)?;
    Ok(PdfDocument::load(bytes)?)
}

/// One pending slide per page.
pub fn slides_for(doc: &dyn DocumentSource) -> Vec<Slide> {
    slides_from_page_count(doc.page_count())
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                lines.push(head);
            }
            let needed = if line.is_empty() { 0 } else { 1 } + word.chars().count();
            if line.chars().count() + needed > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn sample_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for i in 0..pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("Slide {}", i + 1))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn loads_page_count() {
        let doc = load_upload("deck.pdf", &sample_pdf(3)).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(slides_for(&doc).len(), 3);
    }

    #[test]
    fn renders_header_for_each_page() {
        let doc = PdfDocument::load(&sample_pdf(2)).unwrap();
        let page = doc.render_page(1, SizeHints::default()).unwrap();
        assert_eq!(page.page_number, 2);
        assert!(page.lines[0].contains("Page 2 of 2"));
        assert!(matches!(
            doc.render_page(2, SizeHints::default()),
            Err(DocumentError::PageOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn powerpoint_is_rejected_with_convert_message() {
        let err = validate_upload("lecture.PPTX", b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, UploadError::ConvertToPdf { .. }));
        assert!(err.to_string().contains("converted to PDF first"));
        assert!(matches!(
            validate_upload("slides.ppt", b""),
            Err(UploadError::ConvertToPdf { .. })
        ));
    }

    #[test]
    fn other_files_are_rejected() {
        assert!(matches!(
            validate_upload("notes.docx", b"PK"),
            Err(UploadError::Unsupported { .. })
        ));
        assert!(matches!(
            validate_upload("fake.pdf", b"hello"),
            Err(UploadError::NotAPdf { .. })
        ));
        assert!(matches!(
            validate_upload("empty.pdf", b""),
            Err(UploadError::Empty { .. })
        ));
    }

    #[test]
    fn malformed_pdf_fails_to_load() {
        let result = load_upload("broken.pdf", b"%PDF-1.5\nnot really a pdf");
        assert!(matches!(result, Err(CoreError::Document(_))));
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }
}
