//! Error types for intake operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for intake operations
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Errors that can occur while capturing, storing or importing clients
#[derive(Error, Debug)]
pub enum IntakeError {
    /// A bulk import payload is neither an object nor an array of objects
    #[error("Invalid import payload: {0}")]
    InvalidImportPayload(String),

    /// No draft with this id
    #[error("Draft not found: {0}")]
    DraftNotFound(String),

    /// A store file exists but cannot be read as a JSON array, so saving
    /// over it would lose its content
    #[error("Store file {path} is unreadable: {reason}")]
    UnreadableStore { path: PathBuf, reason: String },

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while writing the store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
