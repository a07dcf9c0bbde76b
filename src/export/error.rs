//! Export error types

use thiserror::Error;

/// Errors that prevent a document from being built
#[derive(Debug, Error)]
pub enum ExportError {
    /// The book cannot be exported as submitted (no chapters, bad format)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// XML writer failure while assembling the package document
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Generated markup was not valid UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
