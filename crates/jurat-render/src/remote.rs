//! Rendering service client
//!
//! The remote renderer normalizes the record, serializes it as JSON and posts
//! it to `<service_url>/fill/<form-id>` (form id lower-cased). The response
//! body is the finished PDF. HTTP goes through a [`FillTransport`], so tests
//! can stand in for the network.

use std::sync::Arc;

use async_trait::async_trait;
use jurat_core::{normalize, RawClientRecord};

use crate::error::{RenderError, RenderResult};
use crate::renderer::{canonical_form_id, DocumentRenderer, RenderedDocument};

/// Longest error body kept in [`RenderError::RemoteServiceFailure`]
const MAX_ERROR_BODY: usize = 200;

/// Raw HTTP response from the rendering service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends fill requests to the rendering service
#[async_trait]
pub trait FillTransport: Send + Sync {
    /// POST a JSON body; `Err` means no HTTP response was received
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<TransportResponse, String>;
}

/// [`FillTransport`] backed by reqwest
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "remote")]
impl ReqwestTransport {
    pub fn new(timeout: std::time::Duration) -> RenderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RenderError::RemoteServiceFailure {
                status: 0,
                message: format!("cannot build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "remote")]
#[async_trait]
impl FillTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<TransportResponse, String> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Delegates rendering to an external service
pub struct RemoteRenderer {
    base_url: String,
    transport: Option<Arc<dyn FillTransport>>,
}

impl RemoteRenderer {
    /// Create a renderer using an explicit transport
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn FillTransport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport: Some(transport),
        }
    }

    /// Create a renderer with the default reqwest transport
    ///
    /// Without the `remote` feature the renderer has no transport and every
    /// render fails with [`RenderError::RenderingDependencyMissing`].
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> RenderResult<Self> {
        #[cfg(feature = "remote")]
        let transport: Option<Arc<dyn FillTransport>> =
            Some(Arc::new(ReqwestTransport::new(timeout)?));

        #[cfg(not(feature = "remote"))]
        let transport: Option<Arc<dyn FillTransport>> = {
            log::debug!("Remote rendering compiled out, timeout {:?} unused", timeout);
            None
        };

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint for a form
    pub fn fill_url(&self, form_id: &str) -> String {
        format!(
            "{}/fill/{}",
            self.base_url,
            canonical_form_id(form_id).to_lowercase()
        )
    }
}

#[async_trait]
impl DocumentRenderer for RemoteRenderer {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn render(
        &self,
        record: &RawClientRecord,
        form_id: &str,
    ) -> RenderResult<RenderedDocument> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(RenderError::RenderingDependencyMissing("remote"))?;

        let normalized = normalize(record);
        let body = serde_json::to_vec(&normalized)?;
        let url = self.fill_url(form_id);
        log::debug!("POST {} ({} bytes)", url, body.len());

        let response = transport.post_json(&url, body).await.map_err(|message| {
            RenderError::RemoteServiceFailure { status: 0, message }
        })?;

        if !response.is_success() {
            let mut message = String::from_utf8_lossy(&response.body).into_owned();
            if message.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !message.is_char_boundary(cut) {
                    cut -= 1;
                }
                message.truncate(cut);
            }
            return Err(RenderError::RemoteServiceFailure {
                status: response.status,
                message,
            });
        }

        Ok(RenderedDocument::new(
            form_id,
            &normalized.id,
            response.body,
            self.name(),
        ))
    }
}
