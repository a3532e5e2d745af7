//! Deployment configuration.
//!
//! Browser bundles have no process environment, so the backend URL is baked
//! in at build time from `LEDGER_BACKEND_URL`.

use log::info;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/api/v1/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    backend_url: String,
}

impl AppConfig {
    /// Build a config for the given backend base URL. Endpoint paths are
    /// appended directly, so a trailing slash is added when missing.
    pub fn new(backend_url: impl Into<String>) -> Self {
        let mut backend_url = backend_url.into();
        if !backend_url.ends_with('/') {
            backend_url.push('/');
        }
        Self { backend_url }
    }

    /// Read the config baked in at build time, falling back to the local dev backend
    pub fn from_env() -> Self {
        let config = Self::from_value(option_env!("LEDGER_BACKEND_URL"));
        info!("Using ledger backend at {}", config.backend_url);
        config
    }

    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Self::new(url),
            None => Self::new(DEFAULT_BACKEND_URL),
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}
