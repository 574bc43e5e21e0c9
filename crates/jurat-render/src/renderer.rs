//! Document renderer trait and rendered output
//!
//! A [`DocumentRenderer`] turns a raw client record into the final bytes of
//! one form. Two strategies exist, local and remote; which one runs is an
//! explicit configuration choice, never a fallback.

use async_trait::async_trait;
use jurat_core::{find_form, RawClientRecord};
use sha2::{Digest, Sha256};

use crate::error::RenderResult;

/// Trait for document renderers
///
/// Renderers must be `Send + Sync` so they can be boxed and shared across
/// async tasks.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Human-readable name of this renderer
    fn name(&self) -> &'static str;

    /// Render one form for a client record
    async fn render(&self, record: &RawClientRecord, form_id: &str)
        -> RenderResult<RenderedDocument>;
}

/// A rendered form with metadata
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Canonical form id, e.g. `N-400`
    pub form_id: String,
    /// The PDF bytes
    pub bytes: Vec<u8>,
    /// Name of the renderer that produced this output
    pub renderer: String,
    /// Suggested output file name
    pub file_name: String,
    /// SHA-256 of the bytes
    pub content_hash: String,
}

impl RenderedDocument {
    /// Create a rendered document for a client
    pub fn new(
        form_id: &str,
        client_id: &str,
        bytes: Vec<u8>,
        renderer: impl Into<String>,
    ) -> Self {
        let form_id = canonical_form_id(form_id);
        Self {
            file_name: output_file_name(client_id, &form_id),
            content_hash: content_hash(&bytes),
            form_id,
            bytes,
            renderer: renderer.into(),
        }
    }

    /// Check if the bytes appear to be a PDF
    pub fn is_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF-")
    }
}

/// Catalog spelling of a form id; unknown ids are trimmed and upper-cased
pub fn canonical_form_id(form_id: &str) -> String {
    match find_form(form_id) {
        Some(form) => form.id.to_string(),
        None => form_id.trim().to_uppercase(),
    }
}

/// Output file name for one form: `<client-id>-<FORM-ID>.pdf`
///
/// Clients without an id get `<FORM-ID>.pdf`.
pub fn output_file_name(client_id: &str, form_id: &str) -> String {
    let client_id = client_id.trim();
    if client_id.is_empty() {
        format!("{}.pdf", form_id)
    } else {
        format!("{}-{}.pdf", client_id, form_id)
    }
}

/// Compute SHA-256 hash of rendered bytes
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!(
        "sha256:{}",
        result.iter().map(|b| format!("{:02x}", b)).collect::<String>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_document_metadata() {
        let doc = RenderedDocument::new("n-400", "CL-481516", b"%PDF-1.7\n".to_vec(), "local");
        assert_eq!(doc.form_id, "N-400");
        assert_eq!(doc.file_name, "CL-481516-N-400.pdf");
        assert_eq!(doc.renderer, "local");
        assert!(doc.is_pdf());
        assert!(doc.content_hash.starts_with("sha256:"));
        assert_eq!(doc.content_hash.len(), 7 + 64);
    }

    #[test]
    fn test_output_file_name_without_client_id() {
        assert_eq!(output_file_name("", "I-130"), "I-130.pdf");
    }

    #[test]
    fn test_canonical_form_id() {
        assert_eq!(canonical_form_id(" i-765 "), "I-765");
        assert_eq!(canonical_form_id("ds-160"), "DS-160");
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
    }

    #[test]
    fn test_non_pdf_bytes() {
        let doc = RenderedDocument::new("I-90", "", b"<html>".to_vec(), "remote");
        assert!(!doc.is_pdf());
    }
}
