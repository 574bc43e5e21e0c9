//! Packet assembly
//!
//! Renders several forms for one client, strictly one after another, and
//! concatenates their pages in request order. The first failure aborts the
//! packet; nothing partial is returned.

use jurat_core::RawClientRecord;

use crate::error::{RenderError, RenderResult};
use crate::renderer::{content_hash, DocumentRenderer, RenderedDocument};

/// File name of an assembled packet
pub const PACKET_FILE_NAME: &str = "packet.pdf";

/// A merged multi-form document
#[derive(Debug, Clone)]
pub struct RenderedPacket {
    /// Merged PDF bytes
    pub bytes: Vec<u8>,
    /// Canonical ids of the forms, in page order
    pub form_ids: Vec<String>,
    /// Total pages
    pub page_count: usize,
    /// Suggested output file name
    pub file_name: String,
    /// SHA-256 of the bytes
    pub content_hash: String,
}

/// Assembles packets with one renderer
pub struct PacketAssembler<'a> {
    renderer: &'a dyn DocumentRenderer,
}

impl<'a> PacketAssembler<'a> {
    pub fn new(renderer: &'a dyn DocumentRenderer) -> Self {
        Self { renderer }
    }

    /// Render every form and merge the results
    pub async fn assemble<S: AsRef<str>>(
        &self,
        form_ids: &[S],
        record: &RawClientRecord,
    ) -> RenderResult<RenderedPacket> {
        if form_ids.is_empty() {
            return Err(RenderError::EmptyPacket);
        }

        let mut parts: Vec<RenderedDocument> = Vec::with_capacity(form_ids.len());
        for form_id in form_ids {
            let form_id = form_id.as_ref();
            log::debug!("Packet: rendering {} with {}", form_id, self.renderer.name());
            parts.push(self.renderer.render(record, form_id).await?);
        }

        let (bytes, page_count) = merge_parts(&parts)?;
        Ok(RenderedPacket {
            form_ids: parts.into_iter().map(|p| p.form_id).collect(),
            page_count,
            file_name: PACKET_FILE_NAME.to_string(),
            content_hash: content_hash(&bytes),
            bytes,
        })
    }
}

#[cfg(feature = "local")]
fn merge_parts(parts: &[RenderedDocument]) -> RenderResult<(Vec<u8>, usize)> {
    let invalid = |e: jurat_pdf::PdfError| RenderError::InvalidDocument(e.to_string());

    let mut expected_pages = 0;
    for part in parts {
        expected_pages += jurat_pdf::page_count(&part.bytes).map_err(|e| {
            RenderError::InvalidDocument(format!("{} is not a readable PDF: {}", part.form_id, e))
        })?;
    }

    let bytes = jurat_pdf::merge_documents(parts.iter().map(|p| p.bytes.as_slice()))
        .map_err(invalid)?;
    let page_count = jurat_pdf::page_count(&bytes).map_err(invalid)?;
    if page_count != expected_pages {
        return Err(RenderError::InvalidDocument(format!(
            "merged packet has {} pages, expected {}",
            page_count, expected_pages
        )));
    }
    Ok((bytes, page_count))
}

#[cfg(not(feature = "local"))]
fn merge_parts(_parts: &[RenderedDocument]) -> RenderResult<(Vec<u8>, usize)> {
    Err(RenderError::RenderingDependencyMissing("local"))
}
