//! Error types for rendering

use thiserror::Error;

/// Errors that can occur while rendering documents or packets
///
/// None of these are retried; a failed render never yields partial output.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The fixed template for a form could not be obtained
    #[error("Template for {form_id} unavailable (status {status})")]
    TemplateUnavailable {
        form_id: String,
        /// HTTP status, or 0 for I/O and transport failures
        status: u16,
    },

    /// The capability needed for this render was compiled out
    #[error("Rendering dependency missing: enable the '{0}' feature")]
    RenderingDependencyMissing(&'static str),

    /// The rendering service answered with a failure, or could not be reached
    #[error("Rendering service failed (status {status}): {message}")]
    RemoteServiceFailure {
        /// HTTP status, or 0 when the request never completed
        status: u16,
        message: String,
    },

    /// Template bytes are not a fillable PDF
    #[error("Invalid template for {form_id}: {message}")]
    InvalidTemplate { form_id: String, message: String },

    /// A rendered document could not be processed further
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A packet was requested with no forms
    #[error("Packet contains no forms")]
    EmptyPacket,

    /// The record could not be serialized for the service
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RenderError {
    /// HTTP status carried by the error, 0 when there is none
    pub fn status(&self) -> u16 {
        match self {
            Self::TemplateUnavailable { status, .. } | Self::RemoteServiceFailure { status, .. } => {
                *status
            }
            _ => 0,
        }
    }
}

/// Result type for rendering operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let err = RenderError::RemoteServiceFailure {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.status(), 500);
        assert_eq!(RenderError::EmptyPacket.status(), 0);
        assert_eq!(
            RenderError::TemplateUnavailable {
                form_id: "N-400".to_string(),
                status: 404,
            }
            .status(),
            404
        );
    }

    #[test]
    fn test_dependency_message_names_feature() {
        let err = RenderError::RenderingDependencyMissing("local");
        assert!(err.to_string().contains("'local'"));
    }
}
