//! Rendering settings
//!
//! Read from a TOML file such as:
//!
//! ```toml
//! [render]
//! service_url = "https://render.example.com"
//! template_dir = "forms"
//!
//! [remote]
//! timeout_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default directory holding `<FORM-ID>.pdf` templates
pub const DEFAULT_TEMPLATE_DIR: &str = "forms";

/// Default request timeout for the rendering service, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Strategy and template locations
    pub render: RenderSettings,
    /// Rendering service client
    pub remote: RemoteSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize settings to TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Configured service URL; an empty value counts as unset
    pub fn service_url(&self) -> Option<&str> {
        self.render
            .service_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured template base URL, if any
    pub fn template_url(&self) -> Option<&str> {
        self.render
            .template_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// `[render]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Base URL of the rendering service; selects the remote renderer
    pub service_url: Option<String>,
    /// Directory of local templates
    pub template_dir: PathBuf,
    /// Base URL to fetch templates from instead of `template_dir`
    pub template_url: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            service_url: None,
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            template_url: None,
        }
    }
}

/// `[remote]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Request timeout for the rendering service and template downloads
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RemoteSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
