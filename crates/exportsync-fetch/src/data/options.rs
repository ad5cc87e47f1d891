use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for export retrieval requests.
///
/// # Examples
///
/// ```
/// use exportsync_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .base_url("https://api.example.com")
///     .server_token("secret")
///     .timeout(Duration::from_secs(10));
/// assert_eq!(options.info_url(), "https://api.example.com/export?v=20240304");
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Root of the export API. A trailing slash is ignored.
    ///
    /// Default: `https://api.wit.ai`
    pub base_url: String,

    /// API version sent as the `v` query parameter.
    ///
    /// Default: `20240304`
    pub api_version: String,

    /// Bearer token identifying the application. Sent only to the
    /// export-info endpoint, never to the content location.
    ///
    /// Default: None
    pub server_token: Option<String>,

    /// Deadline for one request, from sending it to the last body byte.
    /// Enforced by `ExportClient` and used by `ReqwestClient::from_options`.
    ///
    /// Default: 30s
    pub timeout: Duration,

    /// Upper bound on a downloaded export body.
    ///
    /// Default: 64 MiB
    pub max_content_bytes: u64,

    /// Extra headers sent with every request.
    ///
    /// Default: empty
    pub headers: Arc<[(String, String)]>,
}

/// Export-info responses are small JSON documents.
pub const MAX_INFO_BYTES: u64 = 1024 * 1024;

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("server_token", &self.server_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_content_bytes", &self.max_content_bytes)
            .field("headers", &self.headers)
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url:          "https://api.wit.ai".to_string(),
            api_version:       "20240304".to_string(),
            server_token:      None,
            timeout:           Duration::from_secs(30),
            max_content_bytes: 64 * 1024 * 1024,
            headers:           Arc::new([]),
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    #[must_use]
    pub fn server_token(mut self, server_token: impl Into<String>) -> Self {
        self.server_token = Some(server_token.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_content_bytes(mut self, max_content_bytes: u64) -> Self {
        self.max_content_bytes = max_content_bytes;
        self
    }

    /// Add a single custom HTTP header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    /// URL of the export-info endpoint.
    pub fn info_url(&self) -> String {
        format!(
            "{}/export?v={}",
            self.base_url.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Headers for the export-info request: custom headers plus authorization.
    pub fn info_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        if let Some(token) = &self.server_token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}
