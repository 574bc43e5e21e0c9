//! In-process renderer
//!
//! Forms with an official template (N-400) are filled from the template
//! obtained through the configured [`TemplateLoader`]. Every other form gets
//! generic placeholder pages listing its schema fields, which needs no
//! template at all.

use std::sync::Arc;

use async_trait::async_trait;
use jurat_core::RawClientRecord;

use crate::error::RenderResult;
use crate::loader::TemplateLoader;
use crate::renderer::{DocumentRenderer, RenderedDocument};

/// Renders documents with lopdf in this process
pub struct LocalRenderer {
    loader: Arc<dyn TemplateLoader>,
}

impl LocalRenderer {
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl DocumentRenderer for LocalRenderer {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn render(
        &self,
        record: &RawClientRecord,
        form_id: &str,
    ) -> RenderResult<RenderedDocument> {
        self.render_in_process(record, form_id).await
    }
}

impl LocalRenderer {
    #[cfg(feature = "local")]
    async fn render_in_process(
        &self,
        record: &RawClientRecord,
        form_id: &str,
    ) -> RenderResult<RenderedDocument> {
        use crate::error::RenderError;
        use jurat_core::{find_form, normalize, preview};

        let normalized = normalize(record);

        let bytes = match jurat_pdf::field_map_for(form_id) {
            Some(map) => {
                let template = self.loader.load(map.form_id).await?;
                log::debug!(
                    "Filling {} template from {}",
                    map.form_id,
                    self.loader.location()
                );
                let filled = jurat_pdf::fill_with(map, &normalized, &template).map_err(|e| {
                    RenderError::InvalidTemplate {
                        form_id: map.form_id.to_string(),
                        message: e.to_string(),
                    }
                })?;
                if !filled.report.missing.is_empty() {
                    log::warn!(
                        "{}: {} binding rules matched no field",
                        map.form_id,
                        filled.report.missing.len()
                    );
                }
                filled.bytes
            }
            None => {
                let (id, title) = match find_form(form_id) {
                    Some(form) => (form.id.to_string(), form.title),
                    None => (form_id.trim().to_uppercase(), "Unknown form"),
                };
                log::debug!("Rendering placeholder for {}", id);
                jurat_pdf::render_placeholder(&id, title, &preview(&normalized, form_id))
                    .map_err(|e| RenderError::InvalidDocument(e.to_string()))?
            }
        };

        Ok(RenderedDocument::new(form_id, &normalized.id, bytes, "local"))
    }

    #[cfg(not(feature = "local"))]
    async fn render_in_process(
        &self,
        _record: &RawClientRecord,
        form_id: &str,
    ) -> RenderResult<RenderedDocument> {
        log::debug!(
            "Local rendering of {} requested but compiled out (templates at {})",
            form_id,
            self.loader.location()
        );
        Err(crate::error::RenderError::RenderingDependencyMissing("local"))
    }
}
