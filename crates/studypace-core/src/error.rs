//! Core error types for studypace-core.
//!
//! The pacing state machine itself never fails; these errors belong to the
//! boundaries around it (upload validation, document loading, the assistant,
//! the summary sink and configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studypace-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected file upload
    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),

    /// Document could not be loaded or read
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Assistant call failed
    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// Summary sink failed
    #[error("Summary error: {0}")]
    Summary(#[from] SummaryError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input validation errors raised before a session is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// PowerPoint decks have to be exported first
    #[error("PowerPoint files need to be converted to PDF first. Please save your presentation as PDF and upload again.")]
    ConvertToPdf { file_name: String },

    /// Anything that is not a PDF
    #[error("Unsupported file '{file_name}'. Please upload a PDF document.")]
    Unsupported { file_name: String },

    /// Named like a PDF but the bytes are not one
    #[error("'{file_name}' does not look like a PDF document")]
    NotAPdf { file_name: String },

    /// Zero-byte upload
    #[error("'{file_name}' is empty")]
    Empty { file_name: String },
}

/// Document capability errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Malformed or unreadable document
    #[error("Failed to load document: {0}")]
    Load(String),

    /// The document parsed but has no pages
    #[error("Document has no pages")]
    NoPages,

    /// Page index outside the document
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// Text extraction failed for one page
    #[error("Failed to extract text from page {page}: {message}")]
    TextExtraction { page: u32, message: String },
}

/// Assistant capability errors.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No credential configured
    #[error("Assistant unavailable: no API key configured (set {env_var})")]
    Unavailable { env_var: String },

    /// Transport failure
    #[error("Assistant request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote answered with an error status or an unusable body
    #[error("Assistant returned an error (HTTP {status}): {message}")]
    Response { status: u16, message: String },

    /// Endpoint could not be built from configuration
    #[error("Invalid assistant endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Session summary sink errors. These are logged, never shown.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// Transport failure
    #[error("Summary request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote rejected the summary
    #[error("Summary endpoint returned HTTP {status}")]
    Rejected { status: u16 },

    /// Sink is switched off in configuration
    #[error("Summary sink disabled")]
    Disabled,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be prepared
    #[error("Configuration directory unavailable: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
