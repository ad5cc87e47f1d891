use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::{debug, trace};

use crate::data::options::MAX_INFO_BYTES;
use crate::data::{ExportInfo, FetchOptions};
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result};

/// Retrieves export info and export content through an [`HttpClient`].
///
/// Each call issues exactly one request; there is no retry. A request that
/// outlives [`FetchOptions::timeout`] fails with [`FetchError::Timeout`].
pub struct ExportClient<C: HttpClient> {
    client:  C,
    options: FetchOptions,
}

impl<C: HttpClient> ExportClient<C> {
    pub fn new(client: C, options: FetchOptions) -> Self { Self { client, options } }

    pub fn options(&self) -> &FetchOptions { &self.options }

    pub fn client(&self) -> &C { &self.client }

    /// Ask the export API where the archive for `app_id` can be downloaded.
    pub async fn fetch_info(&self, app_id: &str) -> Result<ExportInfo> {
        let url = self.options.info_url();
        debug!(app_id, url = %url, "requesting export info");

        let body = self
            .collect(&url, &self.options.info_headers(), MAX_INFO_BYTES)
            .await?;
        let info: ExportInfo =
            serde_json::from_slice(&body).map_err(|e| FetchError::MalformedInfo(e.to_string()))?;

        if info.uri.trim().is_empty() {
            return Err(FetchError::MissingLocation);
        }
        Ok(info)
    }

    /// Download the raw export archive from `location`.
    pub async fn fetch_content(&self, location: &str) -> Result<Bytes> {
        if !(location.starts_with("https://") || location.starts_with("http://")) {
            return Err(FetchError::InvalidUrl(location.to_string()));
        }
        debug!(location, "downloading export content");

        let body = self
            .collect(location, &self.options.headers, self.options.max_content_bytes)
            .await?;
        debug!(bytes = body.len(), "export content downloaded");
        Ok(body)
    }

    async fn collect(&self, url: &str, headers: &[(String, String)], limit: u64) -> Result<Bytes> {
        let timeout = self.options.timeout;
        tokio::time::timeout(timeout, self.collect_body(url, headers, limit))
            .await
            .map_err(|_| FetchError::Timeout { timeout })?
    }

    async fn collect_body(&self, url: &str, headers: &[(String, String)], limit: u64) -> Result<Bytes> {
        let mut stream = self
            .client
            .stream(url, headers)
            .await
            .map_err(Self::map_error)?;
        let mut body = BytesMut::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Self::map_error)?;
            if body.len() as u64 + chunk.len() as u64 > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
            trace!(received = body.len(), "body chunk");
        }

        Ok(body.freeze())
    }

    fn map_error<E: std::error::Error + Send + 'static>(e: E) -> FetchError {
        FetchError::Network(e.to_string())
    }
}
