//! Renderer selection
//!
//! Exactly one strategy serves a configuration:
//!
//! ```text
//! service_url set   -> RemoteRenderer  (POST <service_url>/fill/<form-id>)
//! service_url unset -> LocalRenderer   (template loader + lopdf)
//! ```
//!
//! There is no fallback from one to the other. A remote failure surfaces as
//! is and the local path is never attempted.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::RenderResult;
use crate::loader::{DirTemplateLoader, TemplateLoader};
use crate::local::LocalRenderer;
use crate::remote::{FillTransport, RemoteRenderer};
use crate::renderer::DocumentRenderer;

/// Which renderer a configuration selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    Local,
    Remote,
}

impl RenderStrategy {
    /// Strategy implied by the settings
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.service_url().is_some() {
            Self::Remote
        } else {
            Self::Local
        }
    }
}

/// Build the renderer the settings call for
///
/// `loader` is only used by the local strategy.
pub fn select_renderer(
    settings: &Settings,
    loader: Arc<dyn TemplateLoader>,
) -> RenderResult<Box<dyn DocumentRenderer>> {
    match settings.service_url() {
        Some(url) => {
            log::debug!("Using remote renderer at {}", url);
            Ok(Box::new(RemoteRenderer::new(url, settings.remote.timeout())?))
        }
        None => {
            log::debug!("Using local renderer, templates from {}", loader.location());
            Ok(Box::new(LocalRenderer::new(loader)))
        }
    }
}

/// Build the renderer the settings call for, over a given transport
///
/// Same selection as [`select_renderer`], but the remote strategy posts
/// through `transport` instead of a reqwest client.
pub fn select_renderer_with_transport(
    settings: &Settings,
    loader: Arc<dyn TemplateLoader>,
    transport: Arc<dyn FillTransport>,
) -> Box<dyn DocumentRenderer> {
    match settings.service_url() {
        Some(url) => {
            log::debug!("Using remote renderer at {}", url);
            Box::new(RemoteRenderer::with_transport(url, transport))
        }
        None => {
            log::debug!("Using local renderer, templates from {}", loader.location());
            Box::new(LocalRenderer::new(loader))
        }
    }
}

/// Template loader the settings call for
///
/// A `template_url` selects the HTTP loader when the `remote` feature is
/// enabled; otherwise templates come from `template_dir`.
pub fn template_loader(settings: &Settings) -> RenderResult<Arc<dyn TemplateLoader>> {
    if let Some(url) = settings.template_url() {
        #[cfg(feature = "remote")]
        {
            log::debug!("Loading templates from {}", url);
            let loader = crate::loader::HttpTemplateLoader::new(url, settings.remote.timeout())?;
            return Ok(Arc::new(loader));
        }

        #[cfg(not(feature = "remote"))]
        log::warn!(
            "template_url {} ignored: HTTP loading needs the 'remote' feature",
            url
        );
    }

    Ok(Arc::new(DirTemplateLoader::new(
        settings.render.template_dir.clone(),
    )))
}
