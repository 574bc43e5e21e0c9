//! Error types for PDF operations

use thiserror::Error;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur while reading, filling or writing PDFs
#[derive(Error, Debug)]
pub enum PdfError {
    /// The bytes could not be parsed, or an object lookup failed
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error while serializing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document has no interactive form
    #[error("Document has no AcroForm")]
    MissingAcroForm,

    /// The document structure is not what a PDF requires
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Nothing to merge
    #[error("No documents to merge")]
    NothingToMerge,
}
