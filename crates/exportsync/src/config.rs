//! Retriever configuration.
//!
//! Loaded from TOML, with environment overrides for values that should not
//! live in files:
//!
//! ```toml
//! application_id = "app-42"
//! base_url = "https://api.wit.ai"
//! api_version = "20240304"
//! request_timeout_secs = 30
//! max_export_bytes = 67108864
//! max_entries = 4096
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use exportsync_archive::DecodeOptions;
use exportsync_fetch::FetchOptions;
use serde::Deserialize;

use crate::error::ConfigError;

pub const ENV_SERVER_TOKEN: &str = "EXPORTSYNC_SERVER_TOKEN";
pub const ENV_BASE_URL: &str = "EXPORTSYNC_BASE_URL";

/// Source of the application id a retrieval is keyed by.
pub trait ExportConfiguration {
    /// `None` for a configuration that has not been bound to an app yet.
    fn application_id(&self) -> Option<&str>;
}

impl ExportConfiguration for str {
    fn application_id(&self) -> Option<&str> { Some(self) }
}

impl ExportConfiguration for String {
    fn application_id(&self) -> Option<&str> { Some(self) }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrieverConfig {
    /// Application whose export is retrieved by default.
    pub application_id: Option<String>,

    /// Root of the export API.
    pub base_url: String,

    /// API version sent with export-info requests.
    pub api_version: String,

    /// Bearer token for the export-info endpoint.
    pub server_token: Option<String>,

    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_secs: u64,

    /// Upper bound on a downloaded export, in bytes. Also caps the decoded
    /// size.
    pub max_export_bytes: u64,

    /// Upper bound on archive entries.
    pub max_entries: usize,
}

impl fmt::Debug for RetrieverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrieverConfig")
            .field("application_id", &self.application_id)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("server_token", &self.server_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_export_bytes", &self.max_export_bytes)
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            application_id:       None,
            base_url:             fetch.base_url,
            api_version:          fetch.api_version,
            server_token:         None,
            request_timeout_secs: fetch.timeout.as_secs(),
            max_export_bytes:     fetch.max_content_bytes,
            max_entries:          DecodeOptions::default().max_entries,
        }
    }
}

impl RetrieverConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    #[must_use]
    pub fn application(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn server_token(mut self, server_token: impl Into<String>) -> Self {
        self.server_token = Some(server_token.into());
        self
    }

    /// Set the request timeout, rounded up to whole seconds.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().saturating_add(u64::from(timeout.subsec_nanos() > 0));
        self
    }

    #[must_use]
    pub fn max_export_bytes(mut self, max_export_bytes: u64) -> Self {
        self.max_export_bytes = max_export_bytes;
        self
    }

    #[must_use]
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Apply [`ENV_SERVER_TOKEN`] and [`ENV_BASE_URL`] from the process
    /// environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self { self.with_overrides(|name| std::env::var(name).ok()) }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(ENV_SERVER_TOKEN).filter(|t| !t.is_empty()) {
            self.server_token = Some(token);
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field:  "base_url",
                reason: "must be an http(s) URL",
            });
        }
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field:  "api_version",
                reason: "must not be empty",
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field:  "request_timeout_secs",
                reason: "must be greater than zero",
            });
        }
        if self.max_export_bytes == 0 {
            return Err(ConfigError::Invalid {
                field:  "max_export_bytes",
                reason: "must be greater than zero",
            });
        }
        if self.max_entries == 0 {
            return Err(ConfigError::Invalid {
                field:  "max_entries",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    pub fn request_timeout_duration(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

    pub fn fetch_options(&self) -> FetchOptions {
        let options = FetchOptions::default()
            .base_url(&self.base_url)
            .api_version(&self.api_version)
            .timeout(self.request_timeout_duration())
            .max_content_bytes(self.max_export_bytes);
        match &self.server_token {
            Some(token) => options.server_token(token),
            None => options,
        }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::default()
            .max_entries(self.max_entries)
            .max_total_bytes(self.max_export_bytes)
    }
}

impl ExportConfiguration for RetrieverConfig {
    fn application_id(&self) -> Option<&str> { self.application_id.as_deref() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RetrieverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, "https://api.wit.ai");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn parses_partial_toml() {
        let config = RetrieverConfig::from_toml_str(
            r#"
            application_id = "app-42"
            base_url = "http://localhost:9000"
            max_entries = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.application_id(), Some("app-42"));
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.max_entries, 16);
        assert_eq!(config.api_version, RetrieverConfig::default().api_version);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = RetrieverConfig::from_toml_str("retries = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_invalid_values() {
        let result = RetrieverConfig::from_toml_str("request_timeout_secs = 0");
        assert!(matches!(result, Err(ConfigError::Invalid {
            field: "request_timeout_secs",
            ..
        })));

        let result = RetrieverConfig::from_toml_str(r#"base_url = "ftp://example""#);
        assert!(matches!(result, Err(ConfigError::Invalid { field: "base_url", .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = RetrieverConfig::from_path("/nonexistent/exportsync.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn env_overrides_apply_when_set() {
        let config = RetrieverConfig::default().with_overrides(|name| match name {
            ENV_SERVER_TOKEN => Some("from-env".to_string()),
            ENV_BASE_URL => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.server_token.as_deref(), Some("from-env"));
        assert_eq!(config.base_url, "https://api.wit.ai");
    }

    #[test]
    fn derives_fetch_and_decode_options() {
        let config = RetrieverConfig::default()
            .base_url("http://localhost:9000")
            .server_token("tok")
            .max_export_bytes(1024)
            .max_entries(8);

        let fetch = config.fetch_options();
        assert_eq!(fetch.info_url(), "http://localhost:9000/export?v=20240304");
        assert_eq!(fetch.server_token.as_deref(), Some("tok"));
        assert_eq!(fetch.max_content_bytes, 1024);

        let decode = config.decode_options();
        assert_eq!(decode.max_entries, 8);
        assert_eq!(decode.max_total_bytes, 1024);
    }

    #[test]
    fn request_timeout_rounds_up_to_whole_seconds() {
        let config = RetrieverConfig::default().request_timeout(Duration::from_millis(250));
        assert_eq!(config.request_timeout_secs, 1);
        assert!(config.validate().is_ok());

        let config = RetrieverConfig::default().request_timeout(Duration::from_millis(2500));
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.fetch_options().timeout, Duration::from_secs(3));

        let config = RetrieverConfig::default().request_timeout(Duration::from_secs(7));
        assert_eq!(config.request_timeout_secs, 7);
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", RetrieverConfig::default().server_token("secret"));
        assert!(!rendered.contains("secret"));
    }
}
