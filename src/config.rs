//! Configuration types for pagination buffers
//!
//! A buffer is configured once at construction. The configuration can be
//! built in code or loaded from YAML/JSON:
//!
//! ```yaml
//! frontend:
//!   page_size: 10
//! backend:
//!   page_size: 50
//!   request_keys:
//!     page: page
//!     page_size: size   # null = never send a page size
//! read_ahead: 2
//! navigation: buffered
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Buffer Config
// ============================================================================

/// Complete buffer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Presentation window settings
    pub frontend: FrontendConfig,

    /// Backend fetch settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Number of frontend pages of unshown elements to keep buffered ahead
    /// of the current window before prefetching
    #[serde(default = "default_read_ahead")]
    pub read_ahead: u32,

    /// When navigation forward is allowed while a fetch is in flight
    #[serde(default)]
    pub navigation: NavigationPolicy,
}

fn default_read_ahead() -> u32 {
    2
}

impl BufferConfig {
    /// Create a config with the given frontend page size and defaults elsewhere
    pub fn new(frontend_page_size: u32) -> Self {
        Self {
            frontend: FrontendConfig {
                page_size: frontend_page_size,
            },
            backend: BackendConfig::default(),
            read_ahead: default_read_ahead(),
            navigation: NavigationPolicy::default(),
        }
    }

    /// Set the backend page size
    #[must_use]
    pub fn with_backend_page_size(mut self, size: u32) -> Self {
        self.backend.page_size = Some(size);
        self
    }

    /// Set the request keys used to build fetch parameters
    #[must_use]
    pub fn with_request_keys(mut self, keys: RequestKeys) -> Self {
        self.backend.request_keys = keys;
        self
    }

    /// Set the read-ahead depth in frontend pages
    #[must_use]
    pub fn with_read_ahead(mut self, pages: u32) -> Self {
        self.read_ahead = pages;
        self
    }

    /// Set the navigation policy
    #[must_use]
    pub fn with_navigation(mut self, policy: NavigationPolicy) -> Self {
        self.navigation = policy;
        self
    }

    /// Load a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a file. `.json` files are parsed as JSON,
    /// anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.frontend.page_size == 0 {
            return Err(Error::invalid_value(
                "frontend.page_size",
                "must be a positive integer",
            ));
        }

        if self.backend.page_size == Some(0) {
            return Err(Error::invalid_value(
                "backend.page_size",
                "must be a positive integer when set",
            ));
        }

        if self.read_ahead == 0 {
            return Err(Error::invalid_value("read_ahead", "must be at least 1"));
        }

        let keys = &self.backend.request_keys;
        if keys.page.is_empty() {
            return Err(Error::invalid_value(
                "backend.request_keys.page",
                "cannot be empty",
            ));
        }

        match keys.page_size.as_deref() {
            Some("") => {
                return Err(Error::invalid_value(
                    "backend.request_keys.page_size",
                    "cannot be empty (use null to omit it)",
                ));
            }
            Some(size_key) if size_key == keys.page => {
                return Err(Error::config(format!(
                    "Page key and page size key are both '{size_key}'"
                )));
            }
            _ => {}
        }

        Ok(())
    }

    /// Number of unshown buffered elements below which a prefetch fires
    pub fn read_ahead_threshold(&self) -> u64 {
        u64::from(self.frontend.page_size) * u64::from(self.read_ahead)
    }
}

// ============================================================================
// Frontend / Backend
// ============================================================================

/// Presentation window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Number of elements per frontend page
    pub page_size: u32,
}

/// Backend fetch settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Number of elements per backend page. When unset the page size
    /// parameter is never sent.
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Parameter names used when building the fetch parameters
    #[serde(default)]
    pub request_keys: RequestKeys,
}

/// Parameter names used when building the fetch parameter object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestKeys {
    /// Key carrying the 1-based backend page index
    #[serde(default = "default_page_key")]
    pub page: String,

    /// Key carrying the backend page size. `None` means the backend infers
    /// its own page size.
    #[serde(default = "default_page_size_key")]
    pub page_size: Option<String>,
}

fn default_page_key() -> String {
    "page".to_string()
}

fn default_page_size_key() -> Option<String> {
    Some("size".to_string())
}

impl Default for RequestKeys {
    fn default() -> Self {
        Self {
            page: default_page_key(),
            page_size: default_page_size_key(),
        }
    }
}

impl RequestKeys {
    /// Create request keys with custom names
    pub fn new(page: impl Into<String>, page_size: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            page_size: Some(page_size.into()),
        }
    }

    /// Request keys that never send a page size
    pub fn without_page_size(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            page_size: None,
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Controls `next_page_available` while a fetch is in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// Allow advancing while loading if the next window is already buffered
    #[default]
    Buffered,
    /// Never allow advancing while loading
    Strict,
}
