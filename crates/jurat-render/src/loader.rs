//! Template loaders
//!
//! A [`TemplateLoader`] maps a form id to the bytes of its fixed template.
//! Templates are named `<FORM-ID>.pdf` wherever they live.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{RenderError, RenderResult};
use crate::renderer::canonical_form_id;

/// Source of template bytes
#[async_trait]
pub trait TemplateLoader: Send + Sync {
    /// Where templates come from, for logs
    fn location(&self) -> String;

    /// Fetch the template for a form
    ///
    /// Fails with [`RenderError::TemplateUnavailable`]; `status` is 0 for
    /// I/O and transport failures.
    async fn load(&self, form_id: &str) -> RenderResult<Vec<u8>>;
}

/// File name of a form's template
pub fn template_file_name(form_id: &str) -> String {
    format!("{}.pdf", canonical_form_id(form_id))
}

/// Loads templates from a local directory
#[derive(Debug, Clone)]
pub struct DirTemplateLoader {
    dir: PathBuf,
}

impl DirTemplateLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a form's template
    pub fn template_path(&self, form_id: &str) -> PathBuf {
        self.dir.join(template_file_name(form_id))
    }
}

#[async_trait]
impl TemplateLoader for DirTemplateLoader {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    async fn load(&self, form_id: &str) -> RenderResult<Vec<u8>> {
        let path = self.template_path(form_id);
        tokio::fs::read(&path).await.map_err(|e| {
            log::debug!("Cannot read template {}: {}", path.display(), e);
            RenderError::TemplateUnavailable {
                form_id: canonical_form_id(form_id),
                status: 0,
            }
        })
    }
}

/// In-memory templates keyed by form id
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateLoader {
    templates: HashMap<String, Vec<u8>>,
}

impl MemoryTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template
    pub fn with_template(mut self, form_id: &str, bytes: Vec<u8>) -> Self {
        self.templates.insert(canonical_form_id(form_id), bytes);
        self
    }
}

#[async_trait]
impl TemplateLoader for MemoryTemplateLoader {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn load(&self, form_id: &str) -> RenderResult<Vec<u8>> {
        let form_id = canonical_form_id(form_id);
        self.templates
            .get(&form_id)
            .cloned()
            .ok_or(RenderError::TemplateUnavailable { form_id, status: 404 })
    }
}

/// Fetches templates with `GET <base>/<FORM-ID>.pdf`
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpTemplateLoader {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "remote")]
impl HttpTemplateLoader {
    /// Create a loader for a base URL
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> RenderResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RenderError::RemoteServiceFailure {
                status: 0,
                message: format!("cannot build HTTP client: {}", e),
            })?;
        Ok(Self { base_url, client })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a form's template
    pub fn template_url(&self, form_id: &str) -> String {
        format!("{}/{}", self.base_url, template_file_name(form_id))
    }
}

#[cfg(feature = "remote")]
#[async_trait]
impl TemplateLoader for HttpTemplateLoader {
    fn location(&self) -> String {
        self.base_url.clone()
    }

    async fn load(&self, form_id: &str) -> RenderResult<Vec<u8>> {
        let url = self.template_url(form_id);
        let unavailable = |status: u16| RenderError::TemplateUnavailable {
            form_id: canonical_form_id(form_id),
            status,
        };

        let response = self.client.get(&url).send().await.map_err(|e| {
            log::debug!("GET {} failed: {}", url, e);
            unavailable(0)
        })?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("GET {} returned {}", url, status);
            return Err(unavailable(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|_| unavailable(0))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_file_name() {
        assert_eq!(template_file_name("n-400"), "N-400.pdf");
    }

    #[tokio::test]
    async fn test_dir_loader_reads_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("N-400.pdf"), b"%PDF-1.7").unwrap();

        let loader = DirTemplateLoader::new(dir.path());
        assert_eq!(loader.load("n-400").await.unwrap(), b"%PDF-1.7".to_vec());
    }

    #[tokio::test]
    async fn test_dir_loader_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DirTemplateLoader::new(dir.path());

        let err = loader.load("N-400").await.unwrap_err();
        assert!(matches!(
            err,
            RenderError::TemplateUnavailable { ref form_id, status: 0 } if form_id == "N-400"
        ));
    }

    #[tokio::test]
    async fn test_memory_loader() {
        let loader = MemoryTemplateLoader::new().with_template("N-400", vec![1, 2, 3]);
        assert_eq!(loader.load("n-400").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(loader.load("I-130").await.unwrap_err().status(), 404);
    }

    #[cfg(feature = "remote")]
    #[test]
    fn test_http_loader_url() {
        let loader =
            HttpTemplateLoader::new("https://templates.example.com/", std::time::Duration::from_secs(5))
                .unwrap();
        assert_eq!(loader.base_url(), "https://templates.example.com");
        assert_eq!(
            loader.template_url("i-130"),
            "https://templates.example.com/I-130.pdf"
        );
    }
}
